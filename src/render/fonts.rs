use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use usvg::fontdb;

/// Font database: system fonts plus every font file directly inside `dirs`.
///
/// Directories that are missing or unreadable are skipped.
pub fn build_fontdb(dirs: &[PathBuf], system_fonts: bool) -> Arc<fontdb::Database> {
    let mut db = fontdb::Database::new();
    if system_fonts {
        db.load_system_fonts();
    }
    for dir in dirs {
        load_fonts_from_dir(&mut db, dir);
    }
    tracing::debug!(faces = db.len(), "font database built");
    Arc::new(db)
}

/// Process-wide default database (system fonts only), built on first use.
pub fn default_fontdb() -> Arc<fontdb::Database> {
    static DEFAULT: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    DEFAULT.get_or_init(|| build_fontdb(&[], true)).clone()
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// Resolver that tries the requested families, then the generic sans-serif and serif families,
/// then any loaded face.
pub fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, db| {
            let mut families: Vec<fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Serif => fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => fontdb::Family::Name(s),
                })
                .collect();
            families.extend([fontdb::Family::SansSerif, fontdb::Family::Serif]);

            let style = match font.style() {
                usvg::FontStyle::Normal => fontdb::Style::Normal,
                usvg::FontStyle::Italic => fontdb::Style::Italic,
                usvg::FontStyle::Oblique => fontdb::Style::Oblique,
            };

            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: fontdb::Stretch::Normal,
                style,
            };
            db.query(&query).or_else(|| db.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}
