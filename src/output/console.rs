//! Console summary
//!
//! Same two sections as the log file, but page URLs are shown without their
//! scheme prefix.

use crate::output::aggregator::CrawlResult;
use crate::url::strip_scheme;

/// Formats the console summary of a crawl
pub fn format_console_summary(result: &CrawlResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} Pages Found: \n", result.pages.len()));
    for page in &result.pages {
        out.push_str(strip_scheme(page));
        out.push('\n');
    }

    out.push('\n');

    out.push_str(&format!("{} Assests Found: \n", result.assets.len()));
    for asset in &result.assets {
        out.push_str(asset);
        out.push('\n');
    }

    out
}

/// Prints the console summary to stdout
pub fn print_console_summary(result: &CrawlResult) {
    print!("{}", format_console_summary(result));
}
