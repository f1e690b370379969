/// Human-facing metadata attached to an entity field.
///
/// Forms render `label` next to the input and `help_text` beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    pub label: &'static str,
    pub help_text: &'static str,
}
