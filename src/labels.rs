//! Class label table for the 80-class COCO detection set.

/// The 80 COCO class names, indexed by class id.
pub const COCO_LABELS: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat",
    "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack",
    "umbrella", "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball",
    "kite", "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket",
    "bottle", "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple",
    "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair",
    "couch", "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Class id of `"person"` in [`COCO_LABELS`].
pub const PERSON_CLASS_ID: usize = 0;

/// Returns the label for `class_id`, if it is a valid index.
pub fn label_name(class_id: usize) -> Option<&'static str> {
    COCO_LABELS.get(class_id).copied()
}

/// Returns the class id whose label equals `name`.
///
/// Matching is exact after trimming surrounding whitespace; labels are all
/// lowercase.
pub fn class_id_of(name: &str) -> Option<usize> {
    let name = name.trim();
    COCO_LABELS.iter().position(|label| *label == name)
}
