//! Pandoc include files (`-H`, `-B`, `-A`) per variant.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::variant::FormatVariant;

const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#;

const MARKDOWN_CSS_LINK: &str = r#"<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/github-markdown-css/5.1.0/github-markdown.css">"#;

const PAGE_STYLE: &str = r"
html { background-color: #eee; }
@media (prefers-color-scheme: dark) { html { background-color: #272727; } }
body { width: 92%; max-width: 40em; margin: auto; font-size: 1.2rem; line-height: 1.5; padding-bottom: 3em; }
pre { overflow: auto; }
#TOC { border: 1px solid lightgray; padding: 0.5em; margin-bottom: 1em; }
#TOC > ul { margin-bottom: 0px; }
@media (min-width: 102em) {
  body { position: relative; }
  #TOC { display: block; position: absolute; left: -50%; top: 5em; max-width: 46%; width: 45%; }
}
";

const MENU_STYLE: &str = r"
@media (max-width: 101em) { #TOC { display: none; } }
.topmenu { font-size: 1em; color: lightgrey; }
.topmenu a { color: lightgrey; }
";

/// Polls `/refresh/<name>` and reloads the page once the source changed
/// after the page was loaded.
const AUTOREFRESH_SCRIPT: &str = r"<script>
window.setInterval(function() {
  if (document.visibilityState === 'hidden') {
    return;
  }
  var match = /\/view\/([^?#]+)/.exec(window.location.pathname);
  if (!match) {
    return;
  }
  var since = Math.ceil(window.performance.timing.connectStart / 1000);
  var xhr = new XMLHttpRequest();
  xhr.open('GET', '/refresh/' + match[1] + '?time=' + since);
  xhr.onload = function() {
    if (xhr.status === 200 && xhr.responseText === 'True') {
      window.location.reload();
    }
  };
  xhr.send();
}, 750);
</script>
";

const TOP_MENU: &str = r#"<span class="topmenu">
<span style="text-decoration: underline; cursor: pointer" onclick="var toc = document.getElementById('TOC'); if (toc) { toc.style.display = (toc.style.display !== 'block') ? 'block' : 'none'; }">TOC</span>
Format:
<a href="?fmt=export">Export</a>
<a href="?fmt=simple">Simple</a>
<a href="?fmt=inline">Inline</a>
</span>
"#;

const BODY_OPEN: &str = "<span class=\"markdown-body\">\n";
const BODY_CLOSE: &str = "</span>\n";

/// Include files written for one variant. A `None` slot has no content and
/// is not passed to pandoc.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Includes {
    pub header: Option<PathBuf>,
    pub before: Option<PathBuf>,
    pub after: Option<PathBuf>,
}

impl Includes {
    /// Pandoc arguments referencing the include files.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (flag, path) in [
            ("-H", &self.header),
            ("-B", &self.before),
            ("-A", &self.after),
        ] {
            if let Some(path) = path {
                args.push(flag.to_owned());
                args.push(path.display().to_string());
            }
        }
        args
    }
}

/// Header include content for `variant`.
#[must_use]
pub fn header_html(variant: FormatVariant, autorefresh: bool) -> String {
    let options = variant.options();
    if !options.standalone {
        return String::new();
    }

    let mut html = String::from(VIEWPORT_META);
    html.push('\n');
    if options.styled {
        html.push_str("<style type=\"text/css\">");
        html.push_str(PAGE_STYLE);
        if options.menu {
            html.push_str(MENU_STYLE);
        }
        html.push_str("</style>\n");
        html.push_str(MARKDOWN_CSS_LINK);
        html.push('\n');
    }
    if autorefresh && options.autorefresh {
        html.push_str(AUTOREFRESH_SCRIPT);
    }
    html
}

/// Before-body include content for `variant`.
#[must_use]
pub fn before_html(variant: FormatVariant) -> String {
    let options = variant.options();
    let mut html = String::new();
    if options.menu {
        html.push_str(TOP_MENU);
    }
    if options.body_wrapper {
        html.push_str(BODY_OPEN);
    }
    html
}

/// After-body include content for `variant`.
#[must_use]
pub fn after_html(variant: FormatVariant) -> String {
    if variant.options().body_wrapper {
        BODY_CLOSE.to_owned()
    } else {
        String::new()
    }
}

/// Write the include files for `variant` into `<dir>/<variant>/`.
pub fn write_includes(dir: &Path, variant: FormatVariant, autorefresh: bool) -> io::Result<Includes> {
    if !variant.options().standalone {
        return Ok(Includes::default());
    }

    let variant_dir = dir.join(variant.as_str());
    fs::create_dir_all(&variant_dir)?;

    let write = |file: &str, content: String| -> io::Result<Option<PathBuf>> {
        if content.is_empty() {
            return Ok(None);
        }
        let path = variant_dir.join(file);
        fs::write(&path, content)?;
        Ok(Some(path))
    };

    Ok(Includes {
        header: write("header.html", header_html(variant, autorefresh))?,
        before: write("before.html", before_html(variant))?,
        after: write("after.html", after_html(variant))?,
    })
}
