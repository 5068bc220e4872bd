use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use yolo_decode::io::source_dimensions;
use yolo_decode::{
    ClassTargets, DecodeConfig, Decoder, Detection, Layout, ResizeMode, TensorFormat,
};

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode YOLO output tensors (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for the decode stages.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum TensorEncoding {
    /// Pick by file extension: `.json` is JSON, anything else raw f32.
    #[default]
    Auto,
    F32Le,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LayoutConfig {
    PredictionMajor,
    AttributeMajor,
}

impl From<LayoutConfig> for Layout {
    fn from(value: LayoutConfig) -> Self {
        match value {
            LayoutConfig::PredictionMajor => Layout::PredictionMajor,
            LayoutConfig::AttributeMajor => Layout::AttributeMajor,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ResizeConfig {
    Stretch,
    Letterbox,
}

impl From<ResizeConfig> for ResizeMode {
    fn from(value: ResizeConfig) -> Self {
        match value {
            ResizeConfig::Stretch => ResizeMode::Stretch,
            ResizeConfig::Letterbox => ResizeMode::Letterbox,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecodeConfigJson {
    confidence_threshold: f32,
    iou_threshold: f32,
    model_input_size: u32,
    targets: Vec<String>,
    all_classes: bool,
    num_classes: usize,
    objectness: bool,
    layout: LayoutConfig,
    resize: ResizeConfig,
    clip_to_source: bool,
    class_agnostic: bool,
    max_detections: Option<usize>,
    parallel: bool,
}

impl Default for DecodeConfigJson {
    fn default() -> Self {
        let cfg = DecodeConfig::default();
        Self {
            confidence_threshold: cfg.confidence_threshold,
            iou_threshold: cfg.iou_threshold,
            model_input_size: cfg.model_input_size,
            targets: vec!["person".to_string()],
            all_classes: false,
            num_classes: cfg.format.num_classes,
            objectness: cfg.format.has_objectness,
            layout: LayoutConfig::PredictionMajor,
            resize: ResizeConfig::Stretch,
            clip_to_source: cfg.clip_to_source,
            class_agnostic: cfg.class_agnostic,
            max_detections: cfg.max_detections,
            parallel: cfg.parallel,
        }
    }
}

impl From<DecodeConfigJson> for DecodeConfig {
    fn from(value: DecodeConfigJson) -> Self {
        let targets = if value.all_classes {
            ClassTargets::All
        } else {
            ClassTargets::Labels(value.targets)
        };
        DecodeConfig {
            confidence_threshold: value.confidence_threshold,
            iou_threshold: value.iou_threshold,
            model_input_size: value.model_input_size,
            targets,
            format: TensorFormat {
                num_classes: value.num_classes,
                has_objectness: value.objectness,
                layout: value.layout.into(),
            },
            resize: value.resize.into(),
            clip_to_source: value.clip_to_source,
            class_agnostic: value.class_agnostic,
            max_detections: value.max_detections,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    tensor_path: String,
    tensor_encoding: TensorEncoding,
    image_path: Option<String>,
    source_width: Option<u32>,
    source_height: Option<u32>,
    output_path: Option<String>,
    decode: DecodeConfigJson,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    confidence: f32,
    class_id: usize,
    label: &'static str,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        let [x1, y1, x2, y2] = value.bbox;
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence: value.confidence,
            class_id: value.class_id,
            label: value.label().unwrap_or("unknown"),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    source_width: u32,
    source_height: u32,
    detections: Vec<DetectionRecord>,
}

/// Reads a tensor stored as raw little-endian `f32` values.
fn read_f32_le(path: &Path) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(format!(
            "{}: {} bytes is not a whole number of f32 values",
            path.display(),
            bytes.len()
        )
        .into());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Flattens a (possibly nested) JSON array of numbers in row-major order.
fn flatten_json(value: &Value, out: &mut Vec<f32>) -> Result<(), Box<dyn std::error::Error>> {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_json(item, out)?;
            }
            Ok(())
        }
        Value::Number(n) => {
            let v = n.as_f64().ok_or("tensor value is not representable as f64")?;
            out.push(v as f32);
            Ok(())
        }
        other => Err(format!("unexpected tensor element: {other}").into()),
    }
}

fn read_tensor(path: &Path, encoding: &TensorEncoding) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let is_json = match encoding {
        TensorEncoding::Json => true,
        TensorEncoding::F32Le => false,
        TensorEncoding::Auto => path.extension().is_some_and(|ext| ext == "json"),
    };
    if !is_json {
        return read_f32_le(path);
    }
    let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let mut out = Vec::new();
    flatten_json(&value, &mut out)?;
    Ok(out)
}

fn resolve_source_size(config: &Config) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    match (config.source_width, config.source_height, &config.image_path) {
        (Some(width), Some(height), _) => Ok((width, height)),
        (_, _, Some(path)) => Ok(source_dimensions(path)?),
        _ => Err("set source_width and source_height, or image_path".into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("yolo_decode=debug".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.tensor_path.is_empty() {
        return Err("tensor_path must be set in the config".into());
    }

    let (source_width, source_height) = resolve_source_size(&config)?;
    let tensor = read_tensor(Path::new(&config.tensor_path), &config.tensor_encoding)?;
    let decoder = Decoder::new(config.decode.into())?;
    let detections = decoder.decode(&tensor, source_width, source_height)?;
    tracing::info!(
        values = tensor.len(),
        detections = detections.len(),
        "decoded tensor"
    );

    let output = Output {
        source_width,
        source_height,
        detections: detections.into_iter().map(DetectionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
