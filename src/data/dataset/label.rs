use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct YoloDetection {
    pub class_id: u32,
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
}

impl YoloDetection {
    /// Whether the box lies inside the unit square, as YOLO coordinates should.
    pub fn is_normalized(&self) -> bool {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        self.width >= 0.0
            && self.height >= 0.0
            && self.x_center - half_w >= -f32::EPSILON
            && self.x_center + half_w <= 1.0 + f32::EPSILON
            && self.y_center - half_h >= -f32::EPSILON
            && self.y_center + half_h <= 1.0 + f32::EPSILON
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelInfo {
    pub detections: Vec<YoloDetection>,
    /// Non-empty, non-comment lines that were not `class x y w h`
    pub malformed_lines: usize,
}

impl LabelInfo {
    /// A label with no objects marks a background image.
    pub fn is_background(&self) -> bool {
        self.detections.is_empty()
    }
}

/// Parse the contents of a YOLO label file.
///
/// Format per line: `class_id x_center y_center width height`, coordinates
/// normalized to the image size. Blank lines and `#` comments are ignored.
pub fn parse_label_str(content: &str) -> LabelInfo {
    let mut info = LabelInfo::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let values: Vec<&str> = line.split_whitespace().collect();
        let parsed = match values.as_slice() {
            [class_id, x, y, w, h] => match (
                class_id.parse::<u32>(),
                x.parse::<f32>(),
                y.parse::<f32>(),
                w.parse::<f32>(),
                h.parse::<f32>(),
            ) {
                (Ok(class_id), Ok(x_center), Ok(y_center), Ok(width), Ok(height)) => {
                    Some(YoloDetection {
                        class_id,
                        x_center,
                        y_center,
                        width,
                        height,
                    })
                }
                _ => None,
            },
            _ => None,
        };

        match parsed {
            Some(detection) => info.detections.push(detection),
            None => info.malformed_lines += 1,
        }
    }

    info
}

/// Parse a YOLO label file.
///
/// # Returns
/// * `Some(LabelInfo)` if the file can be read
/// * `None` if the file doesn't exist or cannot be read
pub fn parse_label_file(label_path: &Path) -> Option<LabelInfo> {
    let content = fs::read_to_string(label_path).ok()?;
    Some(parse_label_str(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detections() {
        let info = parse_label_str("0 0.5 0.5 0.1 0.2\n0 0.25 0.75 0.05 0.05\n");
        assert_eq!(info.detections.len(), 2);
        assert_eq!(info.malformed_lines, 0);
        assert_eq!(info.detections[0].class_id, 0);
        assert_eq!(info.detections[1].x_center, 0.25);
        assert!(!info.is_background());
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let info = parse_label_str("# exported by labeler\n\n   \n0 0.5 0.5 0.1 0.2\n");
        assert_eq!(info.detections.len(), 1);
        assert_eq!(info.malformed_lines, 0);
    }

    #[test]
    fn test_parse_counts_malformed_lines() {
        let info = parse_label_str("0 0.5 0.5\nknot 0.1 0.1 0.1 0.1\n0 0.5 0.5 0.1 0.2\n");
        assert_eq!(info.detections.len(), 1);
        assert_eq!(info.malformed_lines, 2);
    }

    #[test]
    fn test_detection_bounds() {
        let info = parse_label_str(
            "0 0.5 0.5 1.0 1.0\n\
             0 0.95 0.5 0.2 0.2\n\
             0 0.5 0.5 -0.1 0.2\n",
        );
        let normalized: Vec<bool> = info
            .detections
            .iter()
            .map(|d| d.is_normalized())
            .collect();
        assert_eq!(normalized, vec![true, false, false]);
    }

    #[test]
    fn test_empty_label_is_background() {
        assert!(parse_label_str("").is_background());
    }

    #[test]
    fn test_parse_missing_file() {
        assert!(parse_label_file(Path::new("/definitely/not/here.txt")).is_none());
    }
}
