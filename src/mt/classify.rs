/// Does the text look like it carries markup?
///
/// Only checks that both `<` and `>` appear somewhere; they need not be
/// paired or form valid tags.
pub fn is_rich_text(text: &str) -> bool {
    text.contains('<') && text.contains('>')
}
