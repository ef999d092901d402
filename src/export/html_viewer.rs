//! # Interactive three.js viewer
//!
//! Produces a single HTML document holding the serialized point cloud and the three.js
//! r128 renderer with its `OrbitControls` (rotate, pan, zoom). With inlined libraries the
//! file opens straight from disk, no server and no network needed.
//!
//! ## Library sources
//!
//! | [`ViewerLibraries`]  | behavior                                                             |
//! |----------------------|----------------------------------------------------------------------|
//! | `Download` (default) | fetch both scripts from cdnjs and inline them, CDN tags on failure   |
//! | `LocalDir(dir)`      | inline `three.min.js` and `OrbitControls.js` read from `dir`         |
//! | `Cdn`                | reference the CDN with `<script src>` tags                           |
use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};

use crate::env_state::Gaia3dEnv;
use crate::gaia3d_errors::Gaia3dError;

pub const THREE_JS_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/three.js/r128/three.min.js";
pub const ORBIT_CONTROLS_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/three.js/r128/controls/OrbitControls.js";

pub const THREE_JS_FILE: &str = "three.min.js";
pub const ORBIT_CONTROLS_FILE: &str = "OrbitControls.js";

/// Where the viewer's JavaScript libraries come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewerLibraries {
    #[default]
    Download,
    LocalDir(Utf8PathBuf),
    Cdn,
}

impl FromStr for ViewerLibraries {
    type Err = std::convert::Infallible;

    /// `download` / `cdn`, anything else is taken as a local directory.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "download" => ViewerLibraries::Download,
            "cdn" => ViewerLibraries::Cdn,
            dir => ViewerLibraries::LocalDir(Utf8PathBuf::from(dir)),
        })
    }
}

impl fmt::Display for ViewerLibraries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerLibraries::Download => write!(f, "download"),
            ViewerLibraries::LocalDir(dir) => write!(f, "{dir}"),
            ViewerLibraries::Cdn => write!(f, "cdn"),
        }
    }
}

/// Library code ready to be placed in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryBlock {
    Inline {
        three_js: String,
        orbit_controls: String,
    },
    Cdn,
}

impl LibraryBlock {
    pub fn is_inline(&self) -> bool {
        matches!(self, LibraryBlock::Inline { .. })
    }

    fn to_html(&self) -> String {
        match self {
            LibraryBlock::Inline {
                three_js,
                orbit_controls,
            } => format!(
                "<script>{}</script>\n<script>{}</script>",
                escape_script(three_js),
                escape_script(orbit_controls)
            ),
            LibraryBlock::Cdn => format!(
                "<script src='{THREE_JS_URL}'></script>\n<script src='{ORBIT_CONTROLS_URL}'></script>"
            ),
        }
    }
}

/// Keep inlined code from closing its own `<script>` element.
fn escape_script(code: &str) -> String {
    code.replace("</script", "<\\/script")
}

fn read_library(dir: &Utf8Path, name: &str) -> Result<String, Gaia3dError> {
    let path = dir.join(name);
    std::fs::read_to_string(&path).map_err(|source| Gaia3dError::ReadFailure { path, source })
}

fn download_library(env: &Gaia3dEnv, url: &str) -> Result<String, Gaia3dError> {
    let response = env.get_from_url(url)?;
    if !response.is_success() {
        return Err(Gaia3dError::ServiceError(format!(
            "HTTP {} for {url}",
            response.status
        )));
    }
    Ok(response.body)
}

/// Resolve the configured library source into code or CDN references.
///
/// Arguments
/// ---------
/// * `libraries`: the configured source
/// * `env`: network environment, required to download; without it `Download` degrades to `Cdn`
///
/// Return
/// ------
/// * the library block; only `LocalDir` can fail (missing or unreadable file)
pub fn resolve_libraries(
    libraries: &ViewerLibraries,
    env: Option<&Gaia3dEnv>,
) -> Result<LibraryBlock, Gaia3dError> {
    match libraries {
        ViewerLibraries::Cdn => Ok(LibraryBlock::Cdn),
        ViewerLibraries::LocalDir(dir) => Ok(LibraryBlock::Inline {
            three_js: read_library(dir, THREE_JS_FILE)?,
            orbit_controls: read_library(dir, ORBIT_CONTROLS_FILE)?,
        }),
        ViewerLibraries::Download => {
            let Some(env) = env else {
                log::warn!("No network environment, referencing three.js from the CDN");
                return Ok(LibraryBlock::Cdn);
            };
            let downloaded = download_library(env, THREE_JS_URL).and_then(|three_js| {
                download_library(env, ORBIT_CONTROLS_URL).map(|orbit_controls| {
                    LibraryBlock::Inline {
                        three_js,
                        orbit_controls,
                    }
                })
            });
            match downloaded {
                Ok(block) => Ok(block),
                Err(err) => {
                    log::warn!("Failed to download three.js libraries: {err}");
                    Ok(LibraryBlock::Cdn)
                }
            }
        }
    }
}

/// Build the viewer document.
///
/// Arguments
/// ---------
/// * `points_json`: the serialized point array, embedded verbatim
/// * `max_radius`: largest galactocentric radius in kpc, used as camera distance
/// * `libraries`: resolved library block
pub fn render_viewer_html(points_json: &str, max_radius: f64, libraries: &LibraryBlock) -> String {
    let libs = libraries.to_html();
    // keep the whole cloud inside the camera frustum
    let far = (max_radius * 4.0).max(1000.0);

    format!(
        r#"<!DOCTYPE html>
<html lang='en'>
<head>
    <meta charset='utf-8'>
    <title>Gaia 3D Stars</title>
    <style>body {{ margin: 0; background: #000; overflow: hidden; }}</style>
</head>
<body>
{libs}
<script>
const data = {points_json};

const scene = new THREE.Scene();
const camera = new THREE.PerspectiveCamera(75, window.innerWidth/window.innerHeight, 0.1, {far:.1});
const renderer = new THREE.WebGLRenderer();
renderer.setSize(window.innerWidth, window.innerHeight);
document.body.appendChild(renderer.domElement);
const controls = new THREE.OrbitControls(camera, renderer.domElement);

const geometry = new THREE.BufferGeometry();
const vertices = [];
for (const star of data) {{
    vertices.push(star.x, star.y, star.z);
}}
geometry.setAttribute('position', new THREE.Float32BufferAttribute(vertices, 3));
const material = new THREE.PointsMaterial({{ color: 0xffffff, size: 0.05 }});
const points = new THREE.Points(geometry, material);
scene.add(points);
camera.position.set(0, 0, {max_radius:.2});
camera.lookAt(new THREE.Vector3(0, 0, 0));

window.addEventListener('resize', () => {{
    camera.aspect = window.innerWidth / window.innerHeight;
    camera.updateProjectionMatrix();
    renderer.setSize(window.innerWidth, window.innerHeight);
}});

function animate() {{
    requestAnimationFrame(animate);
    points.rotation.y += 0.0005;
    controls.update();
    renderer.render(scene, camera);
}}
animate();
</script>
</body>
</html>
"#
    )
}

/// Opening of the data script, the last script of the document.
const DATA_SCRIPT: &str = "<script>\nconst data = ";

/// Extract the literal assigned to `const data` in a viewer document.
///
/// Inlined libraries come first and may contain the same text, so the search starts
/// from the end.
pub fn embedded_data(html: &str) -> Option<&str> {
    let start = html.rfind(DATA_SCRIPT)? + DATA_SCRIPT.len();
    let end = start + html[start..].find(";\n")?;
    Some(&html[start..end])
}
