use super::FieldSchema;

/// Human-readable listing: a summary line, then a header block per item.
pub fn render_listing<T: FieldSchema>(items: &[T]) -> String {
    if items.is_empty() {
        return format!("No {} found\n", T::PLURAL);
    }

    let mut out = format!("\nFound {} {}(s):\n\n", items.len(), T::NOUN);
    for item in items {
        let header = format!("{}: {}", T::LABEL, item.display_id());
        out.push_str(&header);
        out.push('\n');
        out.push_str(&"-".repeat(header.chars().count()));
        out.push('\n');
        for (name, value) in item.fields() {
            out.push_str(&format!("   {name}: {value}\n"));
        }
        out.push('\n');
    }
    out
}
