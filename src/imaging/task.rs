//! The `process_image` task body.
//!
//! Runs on an executor worker. Reports checkpoints at 10, 50 and 90 percent;
//! success itself stands for 100. Any failure is returned as a `TaskError`
//! and recorded by the executor as the task's terminal state.

use super::format::{FormatKind, InputFile};
use super::operations::{self, Operation};
use super::slice;
use crate::error::TaskError;
use crate::executor::registry::{ProgressReporter, TaskContext, TaskHandlerRegistry, TaskResult};
use crate::executor::types::{ProcessImagePayload, ResultDescriptor, PROCESS_IMAGE_HANDLER};

use image::{DynamicImage, ImageFormat};
use std::path::Path;

pub const COPY_OPERATION: &str = "copy";

/// Registers `process_image` with the executor's handler registry.
pub fn register(registry: &TaskHandlerRegistry) {
    registry.register(PROCESS_IMAGE_HANDLER, process_image);
}

pub async fn process_image(ctx: TaskContext) -> TaskResult {
    let payload: ProcessImagePayload = serde_json::from_value(ctx.payload)
        .map_err(|e| TaskError::InvalidPayload(e.to_string()))?;

    tracing::info!("Starting task {} for file: {}", ctx.task_id, payload.file_path);

    let progress = ctx.progress;
    let result = tokio::task::spawn_blocking(move || run(&payload, &progress))
        .await
        .map_err(|e| TaskError::Panicked(e.to_string()))?;

    match &result {
        Ok(descriptor) => tracing::info!(
            "Task {}: Completed successfully ({})",
            ctx.task_id,
            descriptor.output_file
        ),
        Err(e) => tracing::error!("Task {}: Task failed: {}", ctx.task_id, e),
    }

    result
}

/// Synchronous body: dispatch on the resolved format, then persist.
pub fn run(payload: &ProcessImagePayload, progress: &ProgressReporter) -> TaskResult {
    let input = InputFile::resolve(Path::new(&payload.file_path));

    if !input.path.exists() {
        return Err(TaskError::InputNotFound(input.path));
    }

    progress.report(10, "Starting processing...");

    match input.kind {
        FormatKind::VolumeContainer => copy_volume(&input, progress),
        FormatKind::SliceVolume | FormatKind::Standard => {
            transform(&input, &payload.operation, progress)
        }
    }
}

fn copy_volume(input: &InputFile, progress: &ProgressReporter) -> TaskResult {
    progress.report(50, "Copying volume...");

    let output = input.output_path();
    tracing::info!(
        "Copying volume {} to {} without processing",
        input.path.display(),
        output.display()
    );
    std::fs::copy(&input.path, &output).map_err(|e| TaskError::Copy(e.to_string()))?;

    progress.report(90, "Saving results...");

    Ok(ResultDescriptor {
        input_file: input.path.to_string_lossy().into_owned(),
        output_file: output.to_string_lossy().into_owned(),
        operation: COPY_OPERATION.to_string(),
        message: "Volume copied without processing".to_string(),
    })
}

fn transform(input: &InputFile, requested: &str, progress: &ProgressReporter) -> TaskResult {
    let image = match input.kind {
        FormatKind::SliceVolume => DynamicImage::ImageLuma8(slice::decode_dicom(&input.path)?),
        _ => load_raster(&input.path)?,
    };
    tracing::debug!(
        "Opened {} ({}x{}, {:?})",
        input.path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    progress.report(50, "Processing image...");

    let operation = Operation::parse(requested);
    let image = operations::apply(operation, image);

    let output = input.output_path();
    tracing::debug!("Saving {} result to {}", operation.name(), output.display());
    image
        .save_with_format(&output, ImageFormat::Png)
        .map_err(|e| TaskError::ImageSave(e.to_string()))?;

    progress.report(90, "Saving results...");

    Ok(ResultDescriptor {
        input_file: input.path.to_string_lossy().into_owned(),
        output_file: output.to_string_lossy().into_owned(),
        operation: requested.to_string(),
        message: format!("Successfully processed image with {}", requested),
    })
}

fn load_raster(path: &Path) -> Result<DynamicImage, TaskError> {
    image::open(path)
        .map(operations::normalize_mode)
        .map_err(|e| TaskError::ImageDecode(e.to_string()))
}
