use super::{check_volume_shape, exam_path, require_exam_file, ExamStore, LabelTable, RawExam};
use crate::error::{MrnetError, Result};
use crate::types::Label;
use dicom_core::Tag;
use dicom_object::{open_file, InMemDicomObject};
use log::debug;
use std::path::{Path, PathBuf};

// Image Pixel Module Tags
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

/// Transfer syntaxes whose pixel data is stored native, little endian
const NATIVE_TRANSFER_SYNTAXES: [&str; 3] = [
    "1.2.840.10008.1.2",
    "1.2.840.10008.1.2.1",
    "1.2.840.10008.1.2.1.99",
];

/// Exam store backed by one multi-frame DICOM file per exam
///
/// Only native (uncompressed) monochrome pixel data with 8 or 16 bits
/// allocated is supported; each frame becomes one slice.
#[derive(Debug, Clone)]
pub struct DicomExamStore {
    root: PathBuf,
    labels: LabelTable,
}

impl DicomExamStore {
    pub const EXTENSION: &'static str = "dcm";

    /// Creates a store rooted at `root` with preloaded labels
    pub fn new(root: impl Into<PathBuf>, labels: LabelTable) -> Self {
        Self {
            root: root.into(),
            labels,
        }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ExamStore for DicomExamStore {
    fn load(&self, split: &str, exam_type: &str, id: &str) -> Result<RawExam> {
        let path = exam_path(&self.root, split, exam_type, id, Self::EXTENSION);
        require_exam_file(id, &path)?;

        let dcm = open_file(&path)?;
        let transfer_syntax = dcm.meta().transfer_syntax();
        if !NATIVE_TRANSFER_SYNTAXES
            .iter()
            .any(|native| *native == transfer_syntax)
        {
            return Err(MrnetError::DicomError(format!(
                "{}: unsupported transfer syntax {}",
                path.display(),
                transfer_syntax
            )));
        }

        let exam = exam_from_dicom(&dcm)?;
        check_volume_shape(id, &exam)?;
        debug!("Loaded {} with shape {:?}", path.display(), exam.dim());
        Ok(exam)
    }

    fn label_of(&self, id: &str, label_type: &str) -> Result<Label> {
        self.labels.get(id, label_type)
    }
}

/// Decodes the native pixel data of a DICOM object into a volume
pub fn exam_from_dicom(dcm: &InMemDicomObject) -> Result<RawExam> {
    let samples = get_u16_value(dcm, SAMPLES_PER_PIXEL).unwrap_or(1);
    if samples != 1 {
        return Err(MrnetError::DicomError(format!(
            "expected monochrome pixel data, got {} samples per pixel",
            samples
        )));
    }

    let rows = require_u16(dcm, ROWS, "Rows")? as usize;
    let cols = require_u16(dcm, COLUMNS, "Columns")? as usize;
    let bits_allocated = require_u16(dcm, BITS_ALLOCATED, "BitsAllocated")?;
    let signed = get_u16_value(dcm, PIXEL_REPRESENTATION).unwrap_or(0) == 1;
    let frames = get_int_value(dcm, NUMBER_OF_FRAMES).unwrap_or(1);
    if frames < 1 {
        return Err(MrnetError::DicomError(format!(
            "invalid NumberOfFrames {}",
            frames
        )));
    }

    let pixel_data = dcm
        .element(PIXEL_DATA)
        .map_err(|e| MrnetError::DicomError(format!("PixelData: {}", e)))?;
    let bytes = pixel_data.to_bytes()?;

    decode_frames(&bytes, frames as usize, rows, cols, bits_allocated, signed)
}

/// Reinterprets little-endian native pixel bytes as `(frames, rows, cols)`
pub fn decode_frames(
    bytes: &[u8],
    frames: usize,
    rows: usize,
    cols: usize,
    bits_allocated: u16,
    signed: bool,
) -> Result<RawExam> {
    let count = frames * rows * cols;
    let bytes_per_sample = match bits_allocated {
        8 => 1,
        16 => 2,
        other => {
            return Err(MrnetError::DicomError(format!(
                "unsupported BitsAllocated {}",
                other
            )))
        }
    };
    // Odd-length pixel data carries one padding byte
    if bytes.len() < count * bytes_per_sample {
        return Err(MrnetError::ShapeError(format!(
            "pixel data holds {} bytes, expected {} for {}x{}x{}",
            bytes.len(),
            count * bytes_per_sample,
            frames,
            rows,
            cols
        )));
    }

    let values: Vec<f32> = match (bytes_per_sample, signed) {
        (1, false) => bytes[..count].iter().map(|&b| f32::from(b)).collect(),
        (1, true) => bytes[..count].iter().map(|&b| f32::from(b as i8)).collect(),
        (_, false) => bytes[..count * 2]
            .chunks_exact(2)
            .map(|c| f32::from(u16::from_le_bytes([c[0], c[1]])))
            .collect(),
        (_, true) => bytes[..count * 2]
            .chunks_exact(2)
            .map(|c| f32::from(i16::from_le_bytes([c[0], c[1]])))
            .collect(),
    };

    Ok(RawExam::from_shape_vec((frames, rows, cols), values)?)
}

/// Helper to get u16 value from DICOM tag
fn get_u16_value(dcm: &InMemDicomObject, tag: Tag) -> Option<u16> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<u16>().ok())
}

/// Helper to get integer value from DICOM tag
fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}

fn require_u16(dcm: &InMemDicomObject, tag: Tag, name: &str) -> Result<u16> {
    get_u16_value(dcm, tag).ok_or_else(|| MrnetError::DicomError(format!("{} not found", name)))
}
