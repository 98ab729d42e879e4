use super::CardStore;

const WORD_WIDTH: usize = 20;
const TRANSLATION_WIDTH: usize = 25;
const EXAMPLE_WIDTH: usize = 60;

/// Render the card store as a fixed-width table
pub fn render_card_table(cards: &CardStore) -> String {
    if cards.is_empty() {
        return "No cards found.".to_string();
    }

    let rows: Vec<(&str, &str, &str)> = cards
        .iter()
        .map(|(word, card)| (word.as_str(), card.translation.as_str(), card.example.as_str()))
        .collect();

    let index_width = rows.len().to_string().len().max(2);
    let word_width = column_width(rows.iter().map(|r| r.0), "Word", WORD_WIDTH);
    let translation_width = column_width(rows.iter().map(|r| r.1), "Translation", TRANSLATION_WIDTH);

    let header = format!(
        "{:>iw$}  {:<ww$}  {:<tw$}  {:<ew$}",
        "#",
        "Word",
        "Translation",
        "Example",
        iw = index_width,
        ww = word_width,
        tw = translation_width,
        ew = EXAMPLE_WIDTH,
    );
    let separator = "-".repeat(header.chars().count());

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(header);
    out.push(separator.clone());
    for (idx, (word, translation, example)) in rows.iter().enumerate() {
        out.push(format!(
            "{:>iw$}  {:<ww$}  {:<tw$}  {:<ew$}",
            idx + 1,
            truncate(word, word_width),
            truncate(translation, translation_width),
            truncate(example, EXAMPLE_WIDTH),
            iw = index_width,
            ww = word_width,
            tw = translation_width,
            ew = EXAMPLE_WIDTH,
        ));
    }
    out.push(separator);
    out.push(format!("Total cards: {}", rows.len()));

    out.join("\n")
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, title: &str, cap: usize) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(title.len())
        .min(cap)
}

/// Flatten newlines and cut to `max_len` characters with an ellipsis
fn truncate(text: &str, max_len: usize) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() > max_len {
        let mut cut: String = flat.chars().take(max_len.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        flat.to_string()
    }
}
