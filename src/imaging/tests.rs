//! Imaging Module Tests
//!
//! ## Test Scopes
//! - **Format**: Suffix splitting, format dispatch and output naming.
//! - **Slice**: Plane selection and intensity normalization on synthetic arrays.
//! - **Task body**: End-to-end runs against files written to a scratch directory.

#[cfg(test)]
mod tests {
    use crate::error::TaskError;
    use crate::executor::registry::{ProgressReporter, TaskContext, TaskHandlerRegistry};
    use crate::executor::types::{ProcessImagePayload, TaskId, PROCESS_IMAGE_HANDLER};
    use crate::imaging::format::{split_suffix, FormatKind, InputFile};
    use crate::imaging::operations::{self, Operation};
    use crate::imaging::slice::{decode_dicom, normalize_intensities, representative_slice};
    use crate::imaging::task;
    use dicom_core::{DataElement, PrimitiveValue, VR};
    use dicom_dictionary_std::tags;
    use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
    use image::{ColorType, DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
    use ndarray::{array, ArrayD, IxDyn};
    use std::path::{Path, PathBuf};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn write_rgb_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 10) as u8, (y * 10) as u8, 128])
        });
        img.save(&path).unwrap();
        path
    }

    const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";
    const SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7";

    /// Writes an 8-bit, single-sample DICOM file with one or more frames.
    fn write_dicom(
        dir: &Path,
        name: &str,
        photometric: &str,
        rows: u16,
        columns: u16,
        frames: &[Vec<u8>],
    ) -> PathBuf {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(tags::SOP_CLASS_UID, VR::UI, PrimitiveValue::from(SECONDARY_CAPTURE)));
        obj.put(DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, PrimitiveValue::from("1.2.826.0.1.3680043.2.1125.1")));
        obj.put(DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)));
        obj.put(DataElement::new(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, PrimitiveValue::from(photometric)));
        obj.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(rows)));
        obj.put(DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(columns)));
        obj.put(DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(8_u16)));
        obj.put(DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(8_u16)));
        obj.put(DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(7_u16)));
        obj.put(DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)));
        if frames.len() > 1 {
            obj.put(DataElement::new(
                tags::NUMBER_OF_FRAMES,
                VR::IS,
                PrimitiveValue::from(frames.len().to_string()),
            ));
        }
        let pixels: Vec<u8> = frames.concat();
        obj.put(DataElement::new(tags::PIXEL_DATA, VR::OB, PrimitiveValue::U8(pixels.into())));

        let file = obj
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(EXPLICIT_VR_LE)
                    .media_storage_sop_class_uid(SECONDARY_CAPTURE)
                    .media_storage_sop_instance_uid("1.2.826.0.1.3680043.2.1125.1"),
            )
            .unwrap();

        let path = dir.join(name);
        file.write_to_file(&path).unwrap();
        path
    }

    fn row_major(image: &image::GrayImage) -> Vec<u8> {
        image.pixels().map(|p| p.0[0]).collect()
    }

    fn payload(path: &Path, operation: &str) -> ProcessImagePayload {
        ProcessImagePayload {
            file_path: path.to_string_lossy().into_owned(),
            operation: operation.to_string(),
        }
    }

    fn checkpoints(rx: &mut UnboundedReceiver<crate::executor::registry::ProgressUpdate>) -> Vec<u8> {
        let mut seen = Vec::new();
        while let Ok(update) = rx.try_recv() {
            seen.push(update.progress);
        }
        seen
    }

    // ============================================================
    // FORMAT RESOLUTION
    // ============================================================

    #[test]
    fn test_split_suffix_handles_compound_and_case() {
        assert_eq!(split_suffix("scan.nii.gz"), ("scan", ".nii.gz"));
        assert_eq!(split_suffix("SCAN.NII.GZ"), ("SCAN", ".NII.GZ"));
        assert_eq!(split_suffix("photo.PNG"), ("photo", ".PNG"));
        assert_eq!(split_suffix("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_suffix("noext"), ("noext", ""));
        assert_eq!(split_suffix(".hidden"), (".hidden", ""));
    }

    #[test]
    fn test_format_kind_dispatch() {
        assert_eq!(FormatKind::from_suffix(".nii"), FormatKind::VolumeContainer);
        assert_eq!(FormatKind::from_suffix(".NII.GZ"), FormatKind::VolumeContainer);
        assert_eq!(FormatKind::from_suffix(".dcm"), FormatKind::SliceVolume);
        assert_eq!(FormatKind::from_suffix(".DICOM"), FormatKind::SliceVolume);
        assert_eq!(FormatKind::from_suffix(".png"), FormatKind::Standard);
        assert_eq!(FormatKind::from_suffix(""), FormatKind::Standard);
    }

    #[test]
    fn test_output_paths() {
        let volume = InputFile::resolve(Path::new("/data/u1/j1/brain.nii.gz"));
        assert_eq!(volume.kind, FormatKind::VolumeContainer);
        assert_eq!(
            volume.output_path(),
            PathBuf::from("/data/u1/j1/brain_processed.nii.gz")
        );

        let dicom = InputFile::resolve(Path::new("/data/u1/j1/chest.DCM"));
        assert_eq!(dicom.kind, FormatKind::SliceVolume);
        assert_eq!(
            dicom.output_path(),
            PathBuf::from("/data/u1/j1/chest_processed.png")
        );

        let jpeg = InputFile::resolve(Path::new("knee.jpg"));
        assert_eq!(jpeg.output_path(), PathBuf::from("knee_processed.png"));
    }

    #[test]
    fn test_unknown_operation_defaults_to_blur() {
        assert_eq!(Operation::parse("grayscale"), Operation::Grayscale);
        assert_eq!(Operation::parse("resize"), Operation::Resize);
        assert_eq!(Operation::parse("sharpen"), Operation::Blur);
        assert_eq!(Operation::parse(""), Operation::Blur);
    }

    // ============================================================
    // SLICE EXTRACTION
    // ============================================================

    #[test]
    fn test_3d_volume_selects_middle_plane() {
        let values: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let volume = ArrayD::from_shape_vec(IxDyn(&[3, 2, 2]), values).unwrap();

        let slice = representative_slice(volume).unwrap();

        assert_eq!(slice, array![[4.0, 5.0], [6.0, 7.0]]);
    }

    #[test]
    fn test_2d_plane_is_kept() {
        let values: Vec<f32> = (0..6).map(|v| v as f32).collect();
        let plane = ArrayD::from_shape_vec(IxDyn(&[2, 3]), values).unwrap();

        let slice = representative_slice(plane).unwrap();

        assert_eq!(slice.dim(), (2, 3));
        assert_eq!(slice[[1, 2]], 5.0);
    }

    #[test]
    fn test_one_dimensional_result_becomes_two_rows() {
        // Middle plane of a 3x1x4 stack squeezes down to a single row.
        let values: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let volume = ArrayD::from_shape_vec(IxDyn(&[3, 1, 4]), values).unwrap();

        let slice = representative_slice(volume).unwrap();

        assert_eq!(slice.dim(), (2, 4));
        assert_eq!(slice.row(0), slice.row(1));
        assert_eq!(slice[[0, 0]], 4.0);
    }

    #[test]
    fn test_singleton_axes_are_squeezed() {
        let values: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let row = ArrayD::from_shape_vec(IxDyn(&[1, 5]), values).unwrap();

        let slice = representative_slice(row).unwrap();

        assert_eq!(slice.dim(), (2, 5));
    }

    #[test]
    fn test_unsupported_shapes_are_decode_errors() {
        let four_d = ArrayD::<f32>::zeros(IxDyn(&[2, 2, 2, 2]));
        assert!(matches!(
            representative_slice(four_d),
            Err(TaskError::ImageDecode(_))
        ));

        let empty = ArrayD::<f32>::zeros(IxDyn(&[0, 3]));
        assert!(matches!(
            representative_slice(empty),
            Err(TaskError::ImageDecode(_))
        ));
    }

    #[test]
    fn test_normalize_clamps_and_scales() {
        let slice = array![[-10.0f32, 0.0], [50.0, 100.0]];

        let normalized = normalize_intensities(slice.clone(), false);
        assert_eq!(normalized, array![[0u8, 0], [127, 255]]);

        let inverted = normalize_intensities(slice, true);
        assert_eq!(inverted, array![[255u8, 255], [128, 0]]);
    }

    #[test]
    fn test_normalize_all_zero_slice_does_not_divide_by_zero() {
        let slice = array![[0.0f32, -3.0], [0.0, 0.0]];

        let normalized = normalize_intensities(slice, false);

        assert!(normalized.iter().all(|&v| v == 0));
    }

    // ============================================================
    // OPERATIONS
    // ============================================================

    #[test]
    fn test_normalize_mode_drops_alpha() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 40])));
        let normalized = operations::normalize_mode(rgba);
        assert_eq!(normalized.color(), ColorType::Rgb8);

        let luma_alpha = DynamicImage::ImageLumaA8(image::ImageBuffer::from_pixel(
            4,
            4,
            image::LumaA([90u8, 255]),
        ));
        let normalized = operations::normalize_mode(luma_alpha);
        assert_eq!(normalized.color(), ColorType::L8);
    }

    #[test]
    fn test_resize_skips_single_row_images() {
        let row = DynamicImage::ImageRgb8(RgbImage::new(16, 1));
        let resized = operations::apply(Operation::Resize, row);
        assert_eq!(resized.dimensions(), (16, 1));

        let square = DynamicImage::ImageRgb8(RgbImage::new(16, 8));
        let resized = operations::apply(Operation::Resize, square);
        assert_eq!(resized.dimensions(), (512, 512));
    }

    // ============================================================
    // TASK BODY
    // ============================================================

    #[test]
    fn test_grayscale_run_writes_png_and_reports_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_rgb_png(dir.path(), "a.png", 16, 12);
        let (progress, mut rx) = ProgressReporter::channel(TaskId::new());

        let result = task::run(&payload(&input, "grayscale"), &progress).unwrap();

        let output = dir.path().join("a_processed.png");
        assert_eq!(result.output_file, output.to_string_lossy());
        assert_eq!(result.input_file, input.to_string_lossy());
        assert_eq!(result.operation, "grayscale");
        assert_eq!(result.message, "Successfully processed image with grayscale");

        let written = image::open(&output).unwrap();
        assert_eq!(written.color(), ColorType::L8);
        assert_eq!(written.dimensions(), (16, 12));

        assert_eq!(checkpoints(&mut rx), vec![10, 50, 90]);
    }

    #[test]
    fn test_resize_run_outputs_512_square() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_rgb_png(dir.path(), "scan.png", 20, 10);
        let (progress, _rx) = ProgressReporter::channel(TaskId::new());

        let result = task::run(&payload(&input, "resize"), &progress).unwrap();

        let written = image::open(&result.output_file).unwrap();
        assert_eq!(written.dimensions(), (512, 512));
    }

    #[test]
    fn test_non_png_input_is_written_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("xray.bmp");
        RgbImage::from_pixel(8, 8, Rgb([200, 100, 50])).save(&input).unwrap();
        let (progress, _rx) = ProgressReporter::channel(TaskId::new());

        let result = task::run(&payload(&input, "blur"), &progress).unwrap();

        assert!(result.output_file.ends_with("xray_processed.png"));
        let bytes = std::fs::read(&result.output_file).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
    }

    #[test]
    fn test_unknown_operation_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_rgb_png(dir.path(), "b.png", 8, 8);
        let (progress, _rx) = ProgressReporter::channel(TaskId::new());

        let result = task::run(&payload(&input, "sharpen"), &progress).unwrap();

        assert_eq!(result.operation, "sharpen");
        assert!(Path::new(&result.output_file).exists());
    }

    #[test]
    fn test_volume_is_copied_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("brain.nii.gz");
        let content: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        std::fs::write(&input, &content).unwrap();
        let (progress, mut rx) = ProgressReporter::channel(TaskId::new());

        let result = task::run(&payload(&input, "blur"), &progress).unwrap();

        let output = dir.path().join("brain_processed.nii.gz");
        assert_eq!(result.operation, task::COPY_OPERATION);
        assert_eq!(result.output_file, output.to_string_lossy());
        assert_eq!(std::fs::read(&output).unwrap(), content);
        assert_eq!(checkpoints(&mut rx), vec![10, 50, 90]);
    }

    #[test]
    fn test_missing_input_fails_before_any_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.png");
        let (progress, mut rx) = ProgressReporter::channel(TaskId::new());

        let err = task::run(&payload(&input, "blur"), &progress).unwrap_err();

        assert_eq!(err, TaskError::InputNotFound(input.clone()));
        assert!(err.to_string().starts_with("File not found:"));
        assert!(checkpoints(&mut rx).is_empty());
    }

    #[test]
    fn test_corrupt_raster_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.png");
        std::fs::write(&input, b"definitely not a png").unwrap();
        let (progress, _rx) = ProgressReporter::channel(TaskId::new());

        let err = task::run(&payload(&input, "blur"), &progress).unwrap_err();

        assert!(matches!(err, TaskError::ImageDecode(_)));
        assert!(!dir.path().join("broken_processed.png").exists());
    }

    #[test]
    fn test_dicom_monochrome2_decodes_to_normalized_slice() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_dicom(
            dir.path(),
            "plain.dcm",
            "MONOCHROME2",
            2,
            3,
            &[vec![0, 40, 80, 120, 160, 200]],
        );

        let slice = decode_dicom(&input).unwrap();

        assert_eq!(slice.dimensions(), (3, 2));
        let values = row_major(&slice);
        assert_eq!(values.first(), Some(&0));
        assert_eq!(values.last(), Some(&255));
        assert!(values.windows(2).all(|w| w[0] < w[1]), "{:?}", values);
    }

    #[test]
    fn test_dicom_monochrome1_is_inverted() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_dicom(
            dir.path(),
            "inverted.dcm",
            "MONOCHROME1",
            2,
            3,
            &[vec![0, 40, 80, 120, 160, 200]],
        );

        let values = row_major(&decode_dicom(&input).unwrap());

        assert_eq!(values.first(), Some(&255));
        assert_eq!(values.last(), Some(&0));
        assert!(values.windows(2).all(|w| w[0] > w[1]), "{:?}", values);
    }

    #[test]
    fn test_dicom_multi_frame_uses_middle_frame() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_dicom(
            dir.path(),
            "series.dcm",
            "MONOCHROME2",
            2,
            3,
            &[
                vec![0; 6],
                vec![0, 40, 80, 120, 160, 200],
                vec![200, 160, 120, 80, 40, 0],
            ],
        );

        let slice = decode_dicom(&input).unwrap();

        assert_eq!(slice.dimensions(), (3, 2));
        let values = row_major(&slice);
        assert_eq!(values.first(), Some(&0));
        assert_eq!(values.last(), Some(&255));
    }

    #[test]
    fn test_dicom_task_writes_png_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_dicom(
            dir.path(),
            "study.dcm",
            "MONOCHROME2",
            2,
            3,
            &[vec![0, 40, 80, 120, 160, 200]],
        );
        let (progress, mut rx) = ProgressReporter::channel(TaskId::new());

        let result = task::run(&payload(&input, "grayscale"), &progress).unwrap();

        let output = dir.path().join("study_processed.png");
        assert_eq!(PathBuf::from(&result.output_file), output);
        assert_eq!(result.operation, "grayscale");
        assert_eq!(checkpoints(&mut rx), vec![10, 50, 90]);
        let written = image::open(&output).unwrap();
        assert_eq!(written.dimensions(), (3, 2));
        assert_eq!(written.color(), ColorType::L8);
    }

    #[test]
    fn test_corrupt_dicom_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.dcm");
        std::fs::write(&input, vec![0u8; 64]).unwrap();
        let (progress, _rx) = ProgressReporter::channel(TaskId::new());

        let err = task::run(&payload(&input, "grayscale"), &progress).unwrap_err();

        assert!(matches!(err, TaskError::ImageDecode(_)));
    }

    #[tokio::test]
    async fn test_handler_rejects_malformed_payload() {
        let (progress, _rx) = ProgressReporter::channel(TaskId::new());
        let ctx = TaskContext {
            task_id: TaskId::new(),
            payload: serde_json::json!({"path": 42}),
            progress,
        };

        let err = task::process_image(ctx).await.unwrap_err();

        assert!(matches!(err, TaskError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_registered_handler_processes_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_rgb_png(dir.path(), "c.png", 8, 8);
        let registry = TaskHandlerRegistry::new();
        task::register(&registry);
        assert!(registry.has_handler(PROCESS_IMAGE_HANDLER));

        let task_id = TaskId::new();
        let job = crate::executor::types::Task::process_image("grayscale", &input);
        let (progress, _rx) = ProgressReporter::channel(task_id.clone());

        let result = registry.execute(&task_id, &job, progress).await.unwrap();

        assert_eq!(result.operation, "grayscale");
    }
}
