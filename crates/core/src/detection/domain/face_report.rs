use crate::detection::domain::face_detector::FaceFeature;

/// Formats the face/smile display summary: empty for no faces, otherwise
/// `"N Faces"` with `" - M Smiles"` appended when any face is smiling.
pub fn format_face_summary(features: &[FaceFeature]) -> String {
    if features.is_empty() {
        return String::new();
    }

    let mut text = format!("{} Faces", features.len());

    let smiles = features.iter().filter(|f| f.smiling).count();
    if smiles > 0 {
        text += &format!(" - {smiles} Smiles");
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::rect::Rect;

    fn face(smiling: bool) -> FaceFeature {
        FaceFeature {
            region: Rect::new(0.0, 0.0, 10.0, 10.0),
            smiling,
        }
    }

    #[test]
    fn test_no_faces_is_empty() {
        assert_eq!(format_face_summary(&[]), "");
    }

    #[test]
    fn test_faces_without_smiles() {
        assert_eq!(format_face_summary(&[face(false), face(false)]), "2 Faces");
    }

    #[test]
    fn test_faces_with_smiles() {
        let summary = format_face_summary(&[face(true), face(false), face(true)]);
        assert_eq!(summary, "3 Faces - 2 Smiles");
    }

    #[test]
    fn test_single_face_single_smile() {
        assert_eq!(format_face_summary(&[face(true)]), "1 Faces - 1 Smiles");
    }
}
