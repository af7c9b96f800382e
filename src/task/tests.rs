use std::fs;
use std::path::Path;

use image::ImageFormat;
use tempfile::TempDir;

use super::*;
use crate::config::test_config;
use crate::font::fixtures::sfnt;
use crate::image::fixtures::encoded;

fn write(config: &PipelineConfig, relative: &str, content: impl AsRef<[u8]>) {
    let path = config.source_join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn run_dev(name: TaskName, config: &PipelineConfig) -> Result<TaskOutcome> {
    run(name, &TaskContext::new(config, BuildMode::DEVELOPMENT))
}

fn run_prod(name: TaskName, config: &PipelineConfig) -> Result<TaskOutcome> {
    run(name, &TaskContext::new(config, BuildMode::PRODUCTION))
}

fn relative(config: &PipelineConfig, outcome: &TaskOutcome) -> Vec<String> {
    outcome
        .written()
        .iter()
        .map(|p| config.output_relative(p).replace('\\', "/"))
        .collect()
}

fn icon(fill: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path fill="{fill}" d="M0 0h24v24H0z"/></svg>"#
    )
}

// ============================================================================
// clean / copy
// ============================================================================

#[test]
fn test_clean_empties_output_but_keeps_root() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    fs::create_dir_all(config.output_join("css/old")).unwrap();
    fs::write(config.output_join("index.html"), "old").unwrap();

    run_dev(TaskName::Clean, &config).unwrap();
    assert!(config.output_dir().is_dir());
    assert_eq!(fs::read_dir(config.output_dir()).unwrap().count(), 0);
}

#[test]
fn test_clean_creates_missing_output() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    run_dev(TaskName::Clean, &config).unwrap();
    assert!(config.output_dir().is_dir());
}

#[test]
fn test_resources_relative_to_static_base() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "resources/robots.txt", "User-agent: *");
    write(&config, "resources/docs/manual.pdf", b"%PDF");

    let outcome = run_dev(TaskName::Resources, &config).unwrap();
    assert_eq!(relative(&config, &outcome), ["docs/manual.pdf", "robots.txt"]);
    assert_eq!(
        fs::read(config.output_join("docs/manual.pdf")).unwrap(),
        b"%PDF"
    );
}

#[test]
fn test_images_copied_byte_for_byte() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let png = encoded(ImageFormat::Png);
    write(&config, "img/photo.png", &png);
    write(&config, "img/logo.svg", icon("red"));
    write(&config, "img/notes.txt", "not an image");

    let outcome = run_dev(TaskName::Images, &config).unwrap();
    assert_eq!(relative(&config, &outcome), ["img/logo.svg", "img/photo.png"]);
    assert_eq!(fs::read(config.output_join("img/photo.png")).unwrap(), png);
}

// ============================================================================
// styles
// ============================================================================

#[test]
fn test_styles_dev_writes_map() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "scss/_vars.scss", "$accent: #ff0000;");
    write(&config, "scss/main.scss", "@use 'vars';\n.btn { color: vars.$accent; user-select: none; }");

    let outcome = run_dev(TaskName::Styles, &config).unwrap();
    assert_eq!(
        relative(&config, &outcome),
        ["css/main.min.css", "css/main.min.css.map"]
    );

    let css = fs::read_to_string(config.output_join("css/main.min.css")).unwrap();
    assert!(css.contains(".btn{"));
    assert!(css.contains("red") || css.contains("#f00"));
    assert!(css.trim_end().ends_with("/*# sourceMappingURL=main.min.css.map */"));
}

#[test]
fn test_styles_production_has_no_map() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "scss/main.scss", ".a { margin: 0 0 0 0; }");

    let outcome = run_prod(TaskName::Styles, &config).unwrap();
    assert_eq!(relative(&config, &outcome), ["css/main.min.css"]);
    let css = fs::read_to_string(config.output_join("css/main.min.css")).unwrap();
    assert!(!css.contains("sourceMappingURL"));
}

#[test]
fn test_styles_compile_error_is_soft() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "scss/main.scss", ".a { color: $undefined; }");

    let outcome = run_dev(TaskName::Styles, &config).unwrap();
    match outcome {
        TaskOutcome::Failed(failure) => {
            assert_eq!(failure.path, Some(config.source_join("scss/main.scss")));
            assert!(failure.message.contains("Undefined variable"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!config.output_join("css/main.min.css").exists());
}

#[test]
fn test_styles_missing_entry_is_hard() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let err = run_dev(TaskName::Styles, &config).unwrap_err();
    assert!(format!("{err:#}").contains("styles entry not found"));
}

#[test]
fn test_styles_reload_notification() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "scss/main.scss", ".a { color: red; }");

    let (reload, mut rx) = ReloadHandle::channel();
    let ctx = TaskContext::new(&config, BuildMode::DEVELOPMENT).with_reload(&reload);
    run(TaskName::Styles, &ctx).unwrap();

    match rx.try_recv() {
        Ok(crate::actor::messages::WsMsg::Css { target }) => assert_eq!(target, "/css/main.min.css"),
        other => panic!("unexpected message: {other:?}"),
    }
}

// ============================================================================
// markup
// ============================================================================

#[test]
fn test_markup_expands_includes() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(
        &config,
        "index.html",
        r#"<body>@include('html/header.html', { "title": "Home" })</body>"#,
    );
    write(&config, "html/header.html", "<h1>@title</h1>");

    let outcome = run_dev(TaskName::Markup, &config).unwrap();
    assert_eq!(relative(&config, &outcome), ["index.html"]);
    assert_eq!(
        fs::read_to_string(config.output_join("index.html")).unwrap(),
        "<body><h1>Home</h1></body>"
    );
}

#[test]
fn test_markup_missing_fragment_is_soft() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "index.html", "@include('html/nope.html')");

    let outcome = run_dev(TaskName::Markup, &config).unwrap();
    assert!(outcome.is_failed());
    assert!(!config.output_join("index.html").exists());
}

#[cfg(unix)]
#[test]
fn test_markup_unreadable_fragment_is_hard() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "index.html", "<body>@include('html/nav.html')</body>");
    write(&config, "html/nav.html", "<nav></nav>");

    let fragment = config.source_join("html/nav.html");
    fs::set_permissions(&fragment, fs::Permissions::from_mode(0o000)).unwrap();
    // permission bits do not apply to root
    if fs::read(&fragment).is_ok() {
        return;
    }

    let err = run_dev(TaskName::Markup, &config).unwrap_err();
    fs::set_permissions(&fragment, fs::Permissions::from_mode(0o644)).unwrap();

    let message = format!("{err:#}");
    assert!(message.contains("index.html"), "{message}");
    assert!(message.contains("nav.html"), "{message}");
    assert!(!config.output_join("index.html").exists());
}

// ============================================================================
// sprite / fonts / images / scripts
// ============================================================================

#[test]
fn test_sprite_sorted_by_file_name() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "img/logo-b.svg", icon("blue"));
    write(&config, "img/logo-a.svg", icon("red"));
    write(&config, "img/photo.svg", icon("green"));

    let outcome = run_dev(TaskName::Sprite, &config).unwrap();
    assert_eq!(relative(&config, &outcome), ["img/sprite.svg"]);

    let sprite = fs::read_to_string(config.output_join("img/sprite.svg")).unwrap();
    let a = sprite.find(r#"id="logo-a""#).unwrap();
    let b = sprite.find(r#"id="logo-b""#).unwrap();
    assert!(a < b);
    assert!(!sprite.contains("photo"));
}

#[test]
fn test_sprite_without_icons_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let outcome = run_dev(TaskName::Sprite, &config).unwrap();
    assert_eq!(outcome, TaskOutcome::done(vec![]));
    assert!(!config.output_join("img/sprite.svg").exists());
}

#[test]
fn test_fonts_both_formats() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "fonts/body.ttf", sfnt());

    let outcome = run_dev(TaskName::Fonts, &config).unwrap();
    assert_eq!(
        relative(&config, &outcome),
        ["fonts/body.woff", "fonts/body.woff2"]
    );
    assert!(fs::read(config.output_join("fonts/body.woff")).unwrap().starts_with(b"wOFF"));
    assert!(fs::read(config.output_join("fonts/body.woff2")).unwrap().starts_with(b"wOF2"));
}

#[test]
fn test_bad_font_fails_but_good_one_converts() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "fonts/good.ttf", sfnt());
    write(&config, "fonts/bad.otf", b"not a font");

    let outcome = run_dev(TaskName::Fonts, &config).unwrap();
    match outcome {
        TaskOutcome::Failed(failure) => {
            assert_eq!(failure.path, Some(config.source_join("fonts/bad.otf")));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(config.output_join("fonts/good.woff2").exists());
}

#[test]
fn test_webp_skips_excluded_images() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "img/photo.png", encoded(ImageFormat::Png));
    write(&config, "img/css-bg.png", encoded(ImageFormat::Png));

    let outcome = run_dev(TaskName::Webp, &config).unwrap();
    assert_eq!(relative(&config, &outcome), ["img/photo.webp"]);
    let webp = fs::read(config.output_join("img/photo.webp")).unwrap();
    assert_eq!(&webp[..4], b"RIFF");
    assert_eq!(&webp[8..12], b"WEBP");
}

#[test]
fn test_webp_undecodable_is_soft() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "img/broken.jpg", b"\xff\xd8 truncated");

    assert!(run_dev(TaskName::Webp, &config).unwrap().is_failed());
}

#[test]
fn test_optimize_never_grows_output() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let png = encoded(ImageFormat::Png);
    write(&config, "img/photo.png", &png);

    run_prod(TaskName::Images, &config).unwrap();
    let outcome = run_prod(TaskName::ImagesOptimize, &config).unwrap();
    assert_eq!(relative(&config, &outcome), ["img/photo.png"]);
    assert!(fs::read(config.output_join("img/photo.png")).unwrap().len() <= png.len());
}

#[test]
fn test_scripts_without_bundler() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.scripts.bundler = vec![];
    write(
        &config,
        "js/main.js",
        "function add(first, second) { return first + second; }\nconsole.log(add(1, 2));",
    );

    let outcome = run_dev(TaskName::Scripts, &config).unwrap();
    assert_eq!(relative(&config, &outcome), ["js/main.js", "js/main.js.map"]);
    let js = fs::read_to_string(config.output_join("js/main.js")).unwrap();
    assert!(!js.contains("first + second"));
    assert!(js.contains("sourceMappingURL=main.js.map"));
}

#[test]
fn test_scripts_missing_bundler_is_soft() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.scripts.bundler = vec!["assetflow-no-such-bundler".into()];
    write(&config, "js/main.js", "console.log(1);");

    match run_dev(TaskName::Scripts, &config).unwrap() {
        TaskOutcome::Failed(failure) => assert!(failure.message.contains("not found in PATH")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

// ============================================================================
// outcomes
// ============================================================================

#[test]
fn test_outcome_builder_keeps_first_failure_path() {
    let mut builder = OutcomeBuilder::default();
    builder.wrote("b".into());
    builder.fail(Failure::at("x.png", "bad header"));
    builder.fail(Failure::new("second"));

    match builder.finish() {
        TaskOutcome::Failed(failure) => {
            assert_eq!(failure.path.as_deref(), Some(Path::new("x.png")));
            assert_eq!(failure.message, "x.png: bad header\nsecond");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_outcome_builder_sorts_written() {
    let mut builder = OutcomeBuilder::default();
    builder.wrote("b".into());
    builder.wrote("a".into());
    assert_eq!(builder.finish().written(), [Path::new("a"), Path::new("b")]);
}

#[test]
fn test_task_names() {
    assert_eq!(TaskName::from_str("fileinclude", true), Ok(TaskName::Markup));
    assert_eq!(TaskName::from_str("images-optimize", true), Ok(TaskName::ImagesOptimize));
    for task in TaskName::ALL {
        assert_eq!(TaskName::from_str(task.as_str(), true), Ok(task));
    }
}

#[test]
fn test_rerun_produces_same_bytes() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write(&config, "fonts/body.ttf", sfnt());
    write(&config, "img/logo-a.svg", icon("red"));

    let snapshot = |config: &PipelineConfig| {
        [TaskName::Fonts, TaskName::Sprite]
            .into_iter()
            .flat_map(|t| run_dev(t, config).unwrap().written().to_vec())
            .map(|p| fs::read(p).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(snapshot(&config), snapshot(&config));
}

// ============================================================================
// partial rebuild
// ============================================================================

/// Every file under the output root with its bytes, sorted by path.
fn output_snapshot(config: &PipelineConfig) -> Vec<(String, Vec<u8>)> {
    jwalk::WalkDir::new(config.output_dir())
        .sort(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let path = entry.path();
            (config.output_relative(&path).replace('\\', "/"), fs::read(&path).unwrap())
        })
        .collect()
}

#[test]
fn test_vars_partial_change_rebuilds_only_styles() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.scripts.bundler = vec![];
    write(&config, "scss/_vars.scss", "$accent: #ff0000;");
    write(&config, "scss/main.scss", "@use 'vars';\n.btn { color: vars.$accent; }");
    write(&config, "index.html", "<body>@include('html/nav.html')</body>");
    write(&config, "html/nav.html", "<nav>home</nav>");
    write(&config, "js/main.js", "document.title = 'x';");
    write(&config, "img/logo-a.svg", icon("red"));
    write(&config, "img/photo.png", encoded(ImageFormat::Png));
    write(&config, "fonts/body.ttf", sfnt());
    write(&config, "resources/robots.txt", "User-agent: *");

    for task in [
        TaskName::Markup,
        TaskName::Scripts,
        TaskName::Fonts,
        TaskName::Images,
        TaskName::Webp,
        TaskName::Sprite,
        TaskName::Resources,
        TaskName::Styles,
    ] {
        let outcome = run_dev(task, &config).unwrap();
        assert!(!outcome.is_failed(), "{task} failed: {outcome:?}");
    }
    let before = output_snapshot(&config);
    let css_before = fs::read_to_string(config.output_join("css/main.min.css")).unwrap();
    assert!(css_before.contains("red") || css_before.contains("#f00"));

    write(&config, "scss/_vars.scss", "$accent: #0000ff;");
    assert!(!run_dev(TaskName::Styles, &config).unwrap().is_failed());
    let after = output_snapshot(&config);

    let css = fs::read_to_string(config.output_join("css/main.min.css")).unwrap();
    assert!(css.contains("blue") || css.contains("#00f"), "{css}");
    assert!(!css.contains("#f00") && !css.contains("red"), "{css}");

    let untouched = |files: &[(String, Vec<u8>)]| -> Vec<(String, Vec<u8>)> {
        files
            .iter()
            .filter(|(path, _)| !path.starts_with("css/"))
            .cloned()
            .collect()
    };
    let unchanged = untouched(&before);
    assert!(unchanged.len() >= 7, "{:?}", unchanged.iter().map(|(p, _)| p).collect::<Vec<_>>());
    assert_eq!(unchanged, untouched(&after));
}
