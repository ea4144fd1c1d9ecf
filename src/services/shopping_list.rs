// src/services/shopping_list.rs
// DOCUMENTATION: Downloadable shopping list
// PURPOSE: Render the aggregated cart ingredients as a PDF attachment

use std::fs::File;
use std::io::BufReader;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use crate::errors::FoodgramError;
use crate::models::ShoppingListItem;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.pdf";
pub const SHOPPING_LIST_TITLE: &str = "Shopping list:";
pub const SHOPPING_LIST_EMPTY: &str = "Shopping list is empty!";

// A4 in millimetres
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT_MARGIN: f32 = 20.0;
const TOP_LINE: f32 = 270.0;
const LINE_HEIGHT: f32 = 8.0;
const FONT_SIZE: f32 = 14.0;
const EMPTY_FONT_SIZE: f32 = 24.0;

/// Lines that fit between TOP_LINE and the bottom margin
pub const LINES_PER_PAGE: usize = 31;

/// `N. name - amount unit.` numbered from 1
pub fn shopping_list_line(index: usize, item: &ShoppingListItem) -> String {
    format!(
        "{}. {} - {} {}.",
        index + 1,
        item.name,
        item.amount,
        item.measurement_unit
    )
}

/// Title plus numbered lines, split into pages of LINES_PER_PAGE
pub fn shopping_list_pages(items: &[ShoppingListItem]) -> Vec<Vec<String>> {
    if items.is_empty() {
        return vec![vec![SHOPPING_LIST_EMPTY.to_string()]];
    }
    let lines: Vec<String> = std::iter::once(SHOPPING_LIST_TITLE.to_string())
        .chain(items.iter().enumerate().map(|(i, item)| shopping_list_line(i, item)))
        .collect();
    lines.chunks(LINES_PER_PAGE).map(<[String]>::to_vec).collect()
}

fn load_font(
    doc: &PdfDocumentReference,
    font_path: Option<&str>,
) -> Result<IndirectFontRef, FoodgramError> {
    if let Some(path) = font_path {
        match File::open(path) {
            Ok(file) => match doc.add_external_font(BufReader::new(file)) {
                Ok(font) => return Ok(font),
                Err(e) => log::warn!("Cannot load PDF font {}: {:?}", path, e),
            },
            Err(e) => log::warn!("Cannot open PDF font {}: {}", path, e),
        }
    }
    doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| {
        log::error!("Built-in PDF font unavailable: {:?}", e);
        FoodgramError::InternalError
    })
}

/// Render the shopping list as a PDF document
pub fn render_shopping_list(
    items: &[ShoppingListItem],
    font_path: Option<&str>,
) -> Result<Vec<u8>, FoodgramError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        SHOPPING_LIST_TITLE,
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Page 1",
    );
    let font = load_font(&doc, font_path)?;
    let font_size = if items.is_empty() { EMPTY_FONT_SIZE } else { FONT_SIZE };

    for (number, lines) in shopping_list_pages(items).iter().enumerate() {
        let (page, layer) = if number == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Page {}", number + 1))
        };
        let layer = doc.get_page(page).get_layer(layer);

        let mut y = TOP_LINE;
        for line in lines {
            layer.use_text(line.as_str(), font_size, Mm(LEFT_MARGIN), Mm(y), &font);
            y -= LINE_HEIGHT;
        }
    }

    doc.save_to_bytes().map_err(|e| {
        log::error!("Failed to render shopping list PDF: {:?}", e);
        FoodgramError::InternalError
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, unit: &str, amount: i64) -> ShoppingListItem {
        ShoppingListItem {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_lines_number_from_one() {
        let pages = shopping_list_pages(&[item("flour", "g", 450), item("milk", "ml", 300)]);
        assert_eq!(
            pages,
            vec![vec![
                "Shopping list:".to_string(),
                "1. flour - 450 g.".to_string(),
                "2. milk - 300 ml.".to_string(),
            ]]
        );
    }

    #[test]
    fn test_empty_cart_message() {
        assert_eq!(
            shopping_list_pages(&[]),
            vec![vec!["Shopping list is empty!".to_string()]]
        );
    }

    #[test]
    fn test_long_list_breaks_pages() {
        let items: Vec<ShoppingListItem> =
            (0..70).map(|i| item(&format!("item {}", i), "g", 1)).collect();
        let pages = shopping_list_pages(&items);

        // title + 70 lines
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), LINES_PER_PAGE);
        assert_eq!(pages[0][0], SHOPPING_LIST_TITLE);
        assert_eq!(pages[1][0], format!("{}. item {} - 1 g.", LINES_PER_PAGE, LINES_PER_PAGE - 1));
        assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), 71);
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_shopping_list(&[item("flour", "g", 450)], None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let empty = render_shopping_list(&[], None).unwrap();
        assert!(empty.starts_with(b"%PDF"));
    }

    #[test]
    fn test_missing_font_falls_back_to_builtin() {
        let bytes =
            render_shopping_list(&[item("salt", "g", 5)], Some("/nonexistent/font.ttf")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
