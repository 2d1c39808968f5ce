//! Controller artifact rendering.
//!
//! The service worker is an [upon] template embedded into the binary with
//! [`rust-embed`](rust_embed). Every interpolated value goes through the
//! `js` formatter, which escapes it for a single-quoted JavaScript string.

use crate::error::{ErrorKind, Result};
use crate::manifest::{AssetManifest, CACHE_PREFIX};
use crate::policy::EvictionPolicy;
use derive_more::Display;
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

const SERVICE_WORKER: &str = "service-worker.js";

#[derive(Embed)]
#[folder = "../../assets/templates/"]
struct Templates;

/// Shape of the emitted artifact.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// Manifest arrays plus lifecycle logic, loadable as a service worker.
    #[default]
    #[display("service-worker")]
    ServiceWorker,
    /// The bare manifest, for hosts that embed the controller themselves.
    #[display("json")]
    Json,
}
impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "service-worker" | "sw" | "js" => Ok(Self::ServiceWorker),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown artifact format `{other}` (expected `service-worker` or `json`)")),
        }
    }
}

#[derive(Serialize)]
struct Context<'a> {
    cache_name: &'a str,
    cache_prefix: &'a str,
    evict_owned_only: bool,
    core_assets: &'a [String],
    pack_assets: &'a [String],
    country_audio_assets: &'a [String],
}

/// Renders an [`AssetManifest`] into the artifact handed to the host.
///
/// The template is compiled eagerly so a broken embed fails at construction
/// rather than half-way through a build. Output depends on nothing but the
/// manifest and the renderer's settings, so identical inputs render
/// byte-identical artifacts.
pub struct ArtifactRenderer {
    engine: Engine<'static>,
    template: Template<'static>,
    format: Format,
    eviction: EvictionPolicy,
}
impl ArtifactRenderer {
    pub fn new(format: Format, eviction: EvictionPolicy) -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let source = Templates::get(SERVICE_WORKER)
            .map(|file| file.data)
            .ok_or_raise(|| ErrorKind::TemplateNotFound(SERVICE_WORKER.to_string()))?;
        let source = String::from_utf8(source.into_owned()).or_raise(|| ErrorKind::Template)?;
        let template = engine.compile(source).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template, format, eviction })
    }

    #[instrument(skip_all, fields(cache = %manifest.cache(), format = %self.format))]
    pub fn render(&self, manifest: &AssetManifest) -> Result<String> {
        match self.format {
            Format::ServiceWorker => self.render_service_worker(manifest),
            Format::Json => Ok(manifest.to_json()? + "\n"),
        }
    }

    fn render_service_worker(&self, manifest: &AssetManifest) -> Result<String> {
        let context = Context {
            cache_name: manifest.cache().as_str(),
            cache_prefix: CACHE_PREFIX,
            evict_owned_only: self.eviction == EvictionPolicy::OwnedPrefix,
            core_assets: manifest.core_assets(),
            pack_assets: manifest.pack_assets(),
            country_audio_assets: manifest.country_audio_assets(),
        };
        self.template.render(&self.engine, &context).to_string().or_raise(|| ErrorKind::Template)
    }
}

mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Escapes a string for use inside a single-quoted JavaScript literal.
    pub(super) fn escape_js(s: &str) -> String {
        let mut escaped = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '\\' => escaped.push_str("\\\\"),
                '\'' => escaped.push_str("\\'"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                // Line terminators in JS source, even inside string literals.
                '\u{2028}' => escaped.push_str("\\u2028"),
                '\u{2029}' => escaped.push_str("\\u2029"),
                c => escaped.push(c),
            }
        }
        escaped
    }

    fn js_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", escape_js(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("js", js_formatter);
    }
}
