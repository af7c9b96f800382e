//! CSS and JavaScript minification.
//!
//! Uses lightningcss for CSS (vendor prefixing against browser targets) and
//! oxc for JavaScript. Both can emit a source map for development builds.

use anyhow::{Result, anyhow, bail};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use parcel_sourcemap::SourceMap;
use std::path::PathBuf;

/// Minified code plus an optional source map (JSON).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minified {
    pub code: String,
    pub map: Option<String>,
}

impl Minified {
    /// Code with a trailing source map reference, when a map exists.
    ///
    /// CSS uses a block comment, JavaScript a line comment.
    pub fn code_with_map_url(&self, map_name: &str, css: bool) -> String {
        if self.map.is_none() {
            return self.code.clone();
        }
        if css {
            format!("{}\n/*# sourceMappingURL={map_name} */\n", self.code)
        } else {
            format!("{}\n//# sourceMappingURL={map_name}\n", self.code)
        }
    }
}

// ============================================================================
// Browser targets
// ============================================================================

/// Parse `"<browser> <major>[.<minor>[.<patch>]]"` into a browser name and a
/// lightningcss version (`major << 16 | minor << 8 | patch`).
pub fn parse_target(target: &str) -> Result<(String, u32)> {
    let mut parts = target.split_whitespace();
    let (Some(browser), Some(version), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("invalid browser target `{target}`");
    };

    let browser = browser.to_ascii_lowercase();
    if !KNOWN_BROWSERS.contains(&browser.as_str()) {
        bail!("unknown browser `{browser}` in target `{target}`");
    }

    let numbers = version
        .split('.')
        .map(str::parse::<u8>)
        .collect::<Result<Vec<_>, _>>()
        .ok()
        .filter(|n| n.len() <= 3)
        .ok_or_else(|| anyhow!("invalid version `{version}` in target `{target}`"))?;

    let part = |i: usize| u32::from(numbers.get(i).copied().unwrap_or(0));
    Ok((browser, (part(0) << 16) | (part(1) << 8) | part(2)))
}

const KNOWN_BROWSERS: &[&str] = &[
    "android", "chrome", "edge", "firefox", "ie", "ios_saf", "opera", "safari", "samsung",
];

/// Build lightningcss targets from a list like `["chrome 87", "safari 14"]`.
pub fn targets_from(list: &[String]) -> Result<Targets> {
    let mut browsers = Browsers::default();
    for target in list {
        let (name, version) = parse_target(target)?;
        let slot = match name.as_str() {
            "android" => &mut browsers.android,
            "chrome" => &mut browsers.chrome,
            "edge" => &mut browsers.edge,
            "firefox" => &mut browsers.firefox,
            "ie" => &mut browsers.ie,
            "ios_saf" => &mut browsers.ios_saf,
            "opera" => &mut browsers.opera,
            "safari" => &mut browsers.safari,
            _ => &mut browsers.samsung,
        };
        // Lowest listed version wins
        *slot = Some(slot.map_or(version, |v| v.min(version)));
    }
    Ok(Targets::from(browsers))
}

// ============================================================================
// CSS
// ============================================================================

/// Prefix and minify a stylesheet.
///
/// `filename` names the source inside the map.
pub fn minify_css(source: &str, filename: &str, targets: Targets, source_map: bool) -> Result<Minified> {
    let mut sheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("{e}"))?;

    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let mut map = source_map.then(|| {
        let mut map = SourceMap::new("/");
        map.add_source(filename);
        map
    });
    if let Some(map) = map.as_mut() {
        map.set_source_content(0, source)
            .map_err(|e| anyhow!("source map: {e:?}"))?;
    }

    let result = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            source_map: map.as_mut(),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let map = match map.as_mut() {
        Some(map) => Some(map.to_json(None).map_err(|e| anyhow!("source map: {e:?}"))?),
        None => None,
    };

    Ok(Minified {
        code: result.code,
        map,
    })
}

// ============================================================================
// JavaScript
// ============================================================================

/// Mangle, compress and print a script.
pub fn minify_js(source: &str, filename: &str, source_map: bool) -> Result<Minified> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(error) = ret.errors.first() {
        bail!("{filename}: {error}");
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);

    let output = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: source_map.then(|| PathBuf::from(filename)),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program);

    Ok(Minified {
        code: output.code,
        map: output.map.map(|m| m.to_json_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("chrome 87").unwrap(), ("chrome".into(), 87 << 16));
        assert_eq!(
            parse_target("Safari 14.1").unwrap(),
            ("safari".into(), (14 << 16) | (1 << 8))
        );
        assert!(parse_target("chrome").is_err());
        assert!(parse_target("netscape 4").is_err());
        assert!(parse_target("chrome x").is_err());
        assert!(parse_target("chrome 87 extra").is_err());
    }

    #[test]
    fn test_targets_lowest_version_wins() {
        let targets = targets_from(&["chrome 90".into(), "chrome 80".into()]).unwrap();
        assert_eq!(targets.browsers.unwrap().chrome, Some(80 << 16));
    }

    #[test]
    fn test_minify_css() {
        let targets = targets_from(&[]).unwrap();
        let out = minify_css("a {\n  color: #ff0000;\n}\n", "main.css", targets, false).unwrap();
        assert_eq!(out.code, "a{color:red}");
        assert!(out.map.is_none());
    }

    #[test]
    fn test_minify_css_adds_prefixes_for_old_targets() {
        let targets = targets_from(&["safari 8".into()]).unwrap();
        let out = minify_css(".a { user-select: none; }", "main.css", targets, false).unwrap();
        assert!(out.code.contains("-webkit-user-select"), "{}", out.code);
    }

    #[test]
    fn test_minify_css_with_source_map() {
        let targets = targets_from(&[]).unwrap();
        let out = minify_css("a { color: red }", "main.css", targets, true).unwrap();
        let map = out.map.as_deref().unwrap();
        assert!(map.contains("main.css"));
        let with_url = out.code_with_map_url("main.min.css.map", true);
        assert!(with_url.ends_with("/*# sourceMappingURL=main.min.css.map */\n"));
    }

    #[test]
    fn test_minify_css_invalid() {
        let targets = targets_from(&[]).unwrap();
        assert!(minify_css("a[ { color: red }", "main.css", targets, false).is_err());
    }

    #[test]
    fn test_minify_js() {
        let out = minify_js("const answer = 40 + 2;\nconsole.log(answer);\n", "main.js", false).unwrap();
        assert!(!out.code.contains("answer"));
        assert!(out.map.is_none());
        assert_eq!(out.code_with_map_url("main.js.map", false), out.code);
    }

    #[test]
    fn test_minify_js_with_source_map() {
        let out = minify_js("function hello(name) { return 'hi ' + name; }\nhello('x');", "main.js", true)
            .unwrap();
        assert!(out.map.as_deref().unwrap().contains("\"mappings\""));
        assert!(out.code_with_map_url("main.js.map", false).contains("//# sourceMappingURL=main.js.map"));
    }

    #[test]
    fn test_minify_js_syntax_error() {
        let err = minify_js("let = ;", "main.js", false).unwrap_err();
        assert!(err.to_string().starts_with("main.js"));
    }
}
