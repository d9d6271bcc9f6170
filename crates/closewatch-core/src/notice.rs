// Closure notice extraction from registry plugin pages
use scraper::{ElementRef, Html};

/// Element wrapping the plugin description on a registry page
pub const DESCRIPTION_REGION_ID: &str = "tab-description";

/// Class token carried by the notice boxes the registry prints on closed plugins
pub const NOTICE_CLASS_MARKER: &str = "plugin-notice";

/// Pull the closure notice fragments out of a plugin page
///
/// Looks at every element with id `tab-description` and returns the text of
/// its direct children whose class attribute contains `plugin-notice`, in
/// document order. The parser is the HTML5 one, so broken markup never
/// errors out, it just tends to produce fewer matches.
pub fn extract_notices(html: &str) -> Vec<String> {
    // Fresh parser per call, nothing shared between threads
    let document = Html::parse_document(html);

    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().id() == Some(DESCRIPTION_REGION_ID))
        .flat_map(|region| region.children().filter_map(ElementRef::wrap))
        .filter(is_notice)
        .map(|notice| notice.text().collect::<String>())
        .collect()
}

fn is_notice(el: &ElementRef<'_>) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|class| class.contains(NOTICE_CLASS_MARKER))
}
