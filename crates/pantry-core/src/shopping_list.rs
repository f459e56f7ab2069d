//! Rendering a list of missing ingredients for delivery.

use crate::types::IngredientRef;

/// Line used in place of items when nothing is missing.
pub const NOTHING_MISSING: &str = "You have all needed ingredients!";

const SIGNATURE: &str = "Happy cooking!\nSent via Recipe Suggester";

/// A rendered shopping list ready for a delivery channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListMessage {
    pub subject: String,
    pub body: String,
}

impl ShoppingListMessage {
    /// Compose the subject and body for a recipe's missing ingredients.
    pub fn compose(recipe_title: &str, items: &[IngredientRef]) -> Self {
        let lines = format_lines(items);
        let mut body = format!("Shopping List for: {}\n\n", recipe_title);
        if lines.is_empty() {
            body.push_str("Good news! ");
            body.push_str(NOTHING_MISSING);
        } else {
            body.push_str("Items you need:\n");
            body.push_str(&bullet_list(&lines));
        }
        body.push_str("\n\n");
        body.push_str(SIGNATURE);

        Self {
            subject: format!("Shopping List for {}", recipe_title),
            body,
        }
    }
}

/// One human-readable line per ingredient.
///
/// `amount unit name` when both amount and unit are present, else the name.
pub fn format_lines(items: &[IngredientRef]) -> Vec<String> {
    items
        .iter()
        .filter(|i| !i.name.trim().is_empty())
        .map(format_line)
        .collect()
}

fn format_line(item: &IngredientRef) -> String {
    match (item.amount, item.unit()) {
        (Some(amount), Some(unit)) => format!("{} {} {}", format_amount(amount), unit, item.name),
        _ => item.name.clone(),
    }
}

/// Items as "- line" rows, or [`NOTHING_MISSING`] when empty.
pub fn items_text(items: &[IngredientRef]) -> String {
    let lines = format_lines(items);
    if lines.is_empty() {
        NOTHING_MISSING.to_string()
    } else {
        bullet_list(&lines)
    }
}

fn bullet_list(lines: &[String]) -> String {
    lines
        .iter()
        .map(|l| format!("- {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        let rounded = format!("{:.2}", amount);
        rounded.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
