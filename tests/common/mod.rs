#![allow(dead_code)]

use pdf2html::config::{Config, Tool};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Page renders copied out by the stand-in rasterizer.
pub const FIXTURE_SIZE: (u32, u32) = (40, 60);

/// Stand-in for the extractor: `<script> --html|--text|--json <file>`.
/// Body markers: `broken-json` makes `--json` print garbage, `slow` sleeps.
const EXTRACTOR: &str = r#"#!/bin/sh
mode="$1"
file="$2"
if [ ! -s "$file" ]; then
  echo "Unable to parse empty input: $file" >&2
  exit 3
fi
name=$(basename "$file")
if grep -q slow "$file"; then
  sleep 5
fi
if grep -q broken-json "$file" && [ "$mode" = "--json" ]; then
  printf 'not json at all'
  exit 0
fi
case "$mode" in
  --html)
    printf '<html xmlns="http://www.w3.org/1999/xhtml">\n<head>\n<meta name="xmpTPg:NPages" content="2"/>\n<meta name="resourceName" content="%s"/>\n<title></title>\n</head>\n<body><div class="page"><p/>\n<p> First page text \n</p>\n</div>\n<div class="page"><p/>\n<p> Second page text </p>\n</div>\n</body></html>' "$name"
    ;;
  --text)
    printf '\n First page text \n\n\n\n Second page text \n\n'
    ;;
  --json)
    printf '{"xmpTPg:NPages":"2","resourceName":"%s","pdf:charsPerPage":["16","17"],"Content-Type":"application/pdf"}' "$name"
    ;;
  *)
    echo "unknown mode $mode" >&2
    exit 2
    ;;
esac
"#;

/// Stand-in for the rasterizer. `ExtractImages` emits one image per body
/// line starting with `image`; a `bad-raster` marker renders garbage.
const RASTERIZER: &str = r#"#!/bin/sh
fixtures="@FIXTURES@"
case "$1" in
  PDFToImage)
    fmt="$3"
    page="$5"
    file="$8"
    if [ ! -s "$file" ]; then
      echo "Error: empty PDF $file" >&2
      exit 4
    fi
    dir=$(dirname "$file")
    base=$(basename "$file" .pdf)
    if grep -q bad-raster "$file"; then
      printf 'garbage' > "$dir/$base$page.$fmt"
    else
      cp "$fixtures/page.$fmt" "$dir/$base$page.$fmt"
    fi
    ;;
  ExtractImages)
    prefix="$3"
    file="$4"
    if [ ! -s "$file" ]; then
      echo "Error: empty PDF $file" >&2
      exit 4
    fi
    n=$(grep -c '^image' "$file")
    i=1
    while [ "$i" -le "$n" ]; do
      cp "$fixtures/page.png" "$prefix-$i.png"
      i=$((i + 1))
    done
    ;;
  *)
    echo "unknown command $1" >&2
    exit 2
    ;;
esac
"#;

pub struct Tools {
    _dir: TempDir,
    pub extractor: PathBuf,
    pub rasterizer: PathBuf,
}

/// Written once per test binary, before any test spawns a process, so no
/// script is still open for writing when it gets executed.
pub fn tools() -> &'static Tools {
    static TOOLS: OnceLock<Tools> = OnceLock::new();
    TOOLS.get_or_init(|| {
        let dir = tempfile::tempdir().expect("tools dir");
        let (w, h) = FIXTURE_SIZE;
        image::RgbImage::new(w, h)
            .save(dir.path().join("page.png"))
            .expect("png fixture");
        image::RgbImage::new(w, h)
            .save(dir.path().join("page.jpg"))
            .expect("jpg fixture");

        let extractor = dir.path().join("extractor.sh");
        let rasterizer = dir.path().join("rasterizer.sh");
        write_script(&extractor, EXTRACTOR);
        write_script(
            &rasterizer,
            &RASTERIZER.replace("@FIXTURES@", &dir.path().display().to_string()),
        );
        Tools {
            _dir: dir,
            extractor,
            rasterizer,
        }
    })
}

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, body).expect("write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
}

pub struct TestEnv {
    pub root: TempDir,
    pub cfg: Config,
}

impl TestEnv {
    pub fn new() -> Self {
        let tools = tools();
        let root = tempfile::tempdir().expect("test root");
        let mut cfg = Config::default();
        cfg.paths.staging_dir = root.path().join("files").join("pdf");
        cfg.paths.image_dir = root.path().join("files").join("image");
        cfg.extractor = Tool::program(tools.extractor.display().to_string());
        cfg.rasterizer = Tool::program(tools.rasterizer.display().to_string());
        Self { root, cfg }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.cfg.paths.staging_dir
    }

    pub fn image_dir(&self) -> &Path {
        &self.cfg.paths.image_dir
    }

    /// A fake PDF under the test root; `extra` lines steer the stand-in tools.
    pub fn pdf(&self, name: &str, extra: &[&str]) -> PathBuf {
        let path = self.root.path().join(name);
        std::fs::write(&path, pdf_bytes(extra)).expect("write pdf");
        path
    }
}

pub fn pdf_bytes(extra: &[&str]) -> Vec<u8> {
    let mut body = String::from("%PDF-1.3\nfake document body\n");
    for line in extra {
        body.push_str(line);
        body.push('\n');
    }
    body.into_bytes()
}

/// Directory entries, or nothing if the directory was never created.
pub fn entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(rd) => rd.map(|e| e.expect("dir entry").path()).collect(),
        Err(_) => Vec::new(),
    }
}
