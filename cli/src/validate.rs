use anyhow::{bail, Result};
use epoch_core::sitemap::{validate_sitemap, SitemapValidationResult};
use epoch_core::GeneratedSitemap;

/// Print the validation report; fail when the sitemap breaks the protocol.
pub fn report(sitemap: &GeneratedSitemap, origin: &str) -> Result<()> {
    if sitemap.entries.is_empty() && !sitemap.xml.contains("<url>") {
        bail!("Only URL sitemaps can be validated; try --type full");
    }

    let result = validate_sitemap(&sitemap.entries, origin);
    print_report(&result, sitemap.degraded)?;

    if !result.is_valid {
        bail!("Sitemap failed validation with {} error(s)", result.errors.len());
    }
    Ok(())
}

fn print_report(result: &SitemapValidationResult, degraded: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    if degraded {
        eprintln!("warning: an upstream fetch failed, so this sitemap is incomplete");
    }
    for warning in &result.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}
