// Rendering helpers for the plugin list and the admin menu
//
// Everything here only reads a StatusRecord. No network, no cache writes.
use std::collections::BTreeMap;

use crate::models::{PackageId, PackageMetadata, StatusRecord};

/// Drops the box shadow on rows sitting right above a closed-plugin row
pub const STYLE_FIXES: &str = "<style>.plugins tr:has(+ tr.plugin-closed-tr).inactive > th, \
.plugins tr:has(+ tr.plugin-closed-tr).inactive > td, \
.plugins tr:has(+ tr.plugin-closed-tr).active > th, \
.plugins tr:has(+ tr.plugin-closed-tr).active > td \
{-webkit-box-shadow: none; -moz-box-shadow: none; box-shadow: none;}</style>";

const BADGE_TITLE: &str = "Closed plugins";

/// Per-row facts only the host table knows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowContext {
    pub active: bool,
    pub column_count: usize,
}

impl Default for RowContext {
    fn default() -> Self {
        Self {
            active: false,
            column_count: 4,
        }
    }
}

/// Notice row for one closed plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedRow {
    id: PackageId,
    notice: String,
}

impl ClosedRow {
    pub fn notice(&self) -> &str {
        &self.notice
    }

    pub fn render(&self, metadata: &PackageMetadata, ctx: RowContext) -> String {
        let slug = self.id.slug();
        let active_class = if ctx.active { " active" } else { "" };

        format!(
            "<tr class=\"plugin-update-tr{active} plugin-closed-tr\" id=\"{row_id}\" data-slug=\"{slug}\" data-plugin=\"{plugin}\" aria-label=\"{name}\">\
             <td colspan=\"{cols}\" class=\"plugin-update colspanchange\">\
             <div class=\"update-message notice inline notice-error notice-alt\"><p>{notice}</p></div>\
             </td></tr>",
            active = active_class,
            row_id = escape_html(&format!("{}-update", slug)),
            slug = escape_html(&slug),
            plugin = escape_html(self.id.as_str()),
            name = escape_html(&metadata.name),
            cols = ctx.column_count,
            notice = escape_html(&self.notice),
        )
    }
}

/// Explicit identifier -> row mapping, built once per page render
#[derive(Debug, Clone, Default)]
pub struct RowAnnotator {
    rows: BTreeMap<PackageId, ClosedRow>,
}

impl RowAnnotator {
    pub fn from_record(record: &StatusRecord) -> Self {
        let rows = record
            .closed
            .iter()
            .filter(|(_, notice)| !notice.is_empty())
            .map(|(id, notice)| {
                let row = ClosedRow {
                    id: id.clone(),
                    notice: notice.clone(),
                };
                (id.clone(), row)
            })
            .collect();

        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PackageId> {
        self.rows.keys()
    }

    pub fn row(&self, id: &PackageId) -> Option<&ClosedRow> {
        self.rows.get(id)
    }

    /// HTML to print right after the plugin's own row, if it is closed
    pub fn render(&self, id: &PackageId, metadata: &PackageMetadata, ctx: RowContext) -> Option<String> {
        self.row(id).map(|row| row.render(metadata, ctx))
    }
}

/// Count bubble appended to the Plugins menu entry. Nothing when all is well.
pub fn menu_badge(record: &StatusRecord) -> Option<String> {
    let count = record.closed_count();
    if count == 0 {
        return None;
    }

    Some(format!(
        "<span class=\"update-plugins count-{count}\"><span class=\"closed-count\" title=\"{title}\">{count}</span></span>",
        count = count,
        title = BADGE_TITLE,
    ))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClosedSet;
    use chrono::Utc;

    fn record(entries: &[(&str, &str)]) -> StatusRecord {
        let closed: ClosedSet = entries
            .iter()
            .map(|(id, notice)| (PackageId::new(*id), notice.to_string()))
            .collect();
        StatusRecord::new(closed, Utc::now())
    }

    #[test]
    fn test_badge_hidden_when_nothing_closed() {
        assert!(menu_badge(&StatusRecord::default()).is_none());
    }

    #[test]
    fn test_badge_shows_count() {
        let badge = menu_badge(&record(&[("a/a.php", "x"), ("b/b.php", "y")])).unwrap();
        assert!(badge.contains("count-2"));
        assert!(badge.contains(">2</span>"));
        assert!(badge.contains("Closed plugins"));
    }

    #[test]
    fn test_row_only_for_closed_plugins() {
        let annotator = RowAnnotator::from_record(&record(&[("a/a.php", "Closed.")]));
        let meta = PackageMetadata::new("A");

        assert!(annotator
            .render(&PackageId::new("b/b.php"), &meta, RowContext::default())
            .is_none());
        assert!(annotator.row(&PackageId::new("b/b.php")).is_none());
        assert_eq!(
            annotator.row(&PackageId::new("a/a.php")).map(ClosedRow::notice),
            Some("Closed.")
        );

        let row = annotator
            .render(&PackageId::new("a/a.php"), &meta, RowContext::default())
            .unwrap();
        assert!(row.contains("id=\"a-update\""));
        assert!(row.contains("data-slug=\"a\""));
        assert!(row.contains("data-plugin=\"a/a.php\""));
        assert!(row.contains("<p>Closed.</p>"));
        assert!(row.starts_with("<tr class=\"plugin-update-tr plugin-closed-tr\""));
    }

    #[test]
    fn test_active_row_and_columns() {
        let annotator = RowAnnotator::from_record(&record(&[("a/a.php", "Closed.")]));
        let row = annotator
            .render(
                &PackageId::new("a/a.php"),
                &PackageMetadata::new("A"),
                RowContext {
                    active: true,
                    column_count: 5,
                },
            )
            .unwrap();

        assert!(row.contains("plugin-update-tr active plugin-closed-tr"));
        assert!(row.contains("colspan=\"5\""));
    }

    #[test]
    fn test_row_escapes_text() {
        let annotator =
            RowAnnotator::from_record(&record(&[("a/a.php", "<script>alert(\"x\")</script>")]));
        let row = annotator
            .render(
                &PackageId::new("a/a.php"),
                &PackageMetadata::new("A & B"),
                RowContext::default(),
            )
            .unwrap();

        assert!(!row.contains("<script>"));
        assert!(row.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"));
        assert!(row.contains("A &amp; B"));
    }

    #[test]
    fn test_empty_notices_get_no_row() {
        let annotator = RowAnnotator::from_record(&record(&[("a/a.php", "")]));
        assert!(annotator.is_empty());
    }
}
