//! Shopping-list PDF rendering.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::domain::shopping_list::ShoppingListItem;
use crate::error::ApiError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LEFT_MARGIN_MM: f32 = 20.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const TITLE_Y_MM: f32 = 277.0;
const TITLE_SIZE_PT: f32 = 24.0;
const BODY_SIZE_PT: f32 = 14.0;
const BODY_START_FIRST_PAGE_MM: f32 = 267.0;
const BODY_START_CONTINUATION_MM: f32 = 277.0;
const LINE_STEP_MM: f32 = 8.0;

/// Where one list line lands: page index and baseline height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePlacement {
    pub page: usize,
    pub y_mm: f32,
}

/// Lay out `count` lines top-down. The first page starts below the title;
/// continuation pages reuse the title's height and carry no title of their
/// own. A line is moved to the next page once its baseline would cross the
/// bottom margin.
pub fn plan_lines(count: usize) -> Vec<LinePlacement> {
    let mut placements = Vec::with_capacity(count);
    let mut page = 0usize;
    let mut y = BODY_START_FIRST_PAGE_MM;
    for _ in 0..count {
        if y < BOTTOM_MARGIN_MM {
            page += 1;
            y = BODY_START_CONTINUATION_MM;
        }
        placements.push(LinePlacement { page, y_mm: y });
        y -= LINE_STEP_MM;
    }
    placements
}

/// Uppercase the first character only; the rest of the name is untouched.
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render the aggregated list into a PDF document.
///
/// An empty list still produces a valid single-page document with only the
/// title. A font or serialization failure is fatal; there is no plain-text
/// fallback.
pub fn render_shopping_list(items: &[ShoppingListItem]) -> Result<Vec<u8>, ApiError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Shopping cart",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "list",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow::anyhow!("load builtin font: {e}"))?;

    doc.get_page(first_page).get_layer(first_layer).use_text(
        "Shopping cart",
        TITLE_SIZE_PT,
        Mm(LEFT_MARGIN_MM),
        Mm(TITLE_Y_MM),
        &font,
    );

    let mut pages = vec![(first_page, first_layer)];
    for (index, (item, placement)) in items.iter().zip(plan_lines(items.len())).enumerate() {
        while placement.page >= pages.len() {
            pages.push(doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "list"));
        }
        let (page, layer) = pages[placement.page];
        let line = format!(
            "{}. {} - {} {}",
            index + 1,
            capitalize_first(&item.name),
            item.total_amount,
            item.measurement_unit,
        );
        doc.get_page(page).get_layer(layer).use_text(
            line,
            BODY_SIZE_PT,
            Mm(LEFT_MARGIN_MM),
            Mm(placement.y_mm),
            &font,
        );
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| anyhow::anyhow!("serialize shopping list pdf: {e}"))?;
    Ok(bytes)
}
