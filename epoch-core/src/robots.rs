//! robots.txt rendering.

use std::fmt::Write;

use crate::config::SiteConfig;
use crate::sitemap::SITEMAP_FILES;

pub const DISALLOWED_PATHS: &[&str] = &[
    "/wp-admin/",
    "/wp-content/",
    "/wp-includes/",
    "/api/",
    "/dashboard/",
    "/auth/",
    "/admin/",
    "/*.json",
    "/*?*utm_*",
    "/*?*fbclid*",
    "/*?*gclid*",
];

/// Crawlers refused the whole site.
pub const BLOCKED_AGENTS: &[&str] = &["GPTBot", "ChatGPT-User", "CCBot", "anthropic-ai", "Claude-Web"];

pub fn render_robots(config: &SiteConfig) -> String {
    let mut out = String::new();

    out.push_str("User-agent: *\nAllow: /\n");
    for path in DISALLOWED_PATHS {
        let _ = writeln!(out, "Disallow: {}", path);
    }

    for agent in BLOCKED_AGENTS {
        let _ = write!(out, "\nUser-agent: {}\nDisallow: /\n", agent);
    }

    out.push('\n');
    for file in SITEMAP_FILES {
        let _ = writeln!(out, "Sitemap: {}", config.frontend(file));
    }
    let _ = writeln!(out, "Host: {}", config.frontend_url);

    out
}
