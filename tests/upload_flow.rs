// End-to-end upload scenarios driven through the controller.
use image::{ImageFormat, RgbaImage};
use image_to_palette_wasm::{
    Algorithm, Clipboard, ClipboardError, Completion, ExtractConfig, Status, UploadController,
    UploadState, extract_palette_bytes,
};
use std::io::Cursor;

#[derive(Default)]
struct MemoryClipboard {
    contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

fn encode(width: u32, height: u32, pixels: &[[u8; 4]], format: ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_raw(width, height, pixels.concat()).unwrap();
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn red_green_blue() -> Vec<u8> {
    encode(
        2,
        2,
        &[[255, 0, 0, 255], [255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]],
        ImageFormat::Png,
    )
}

#[test]
fn red_dominates_two_by_two_image() {
    let config = ExtractConfig {
        color_count: 3,
        ..ExtractConfig::default()
    };
    let swatches = extract_palette_bytes(&red_green_blue(), "image/png", &config).unwrap();
    let hexes: Vec<String> = swatches.iter().map(|s| s.hex.to_string()).collect();
    assert_eq!(hexes.len(), 3);
    assert_eq!(hexes[0], "#FF0000");
    assert!(hexes[1..].contains(&"#00FF00".to_string()));
    assert!(hexes[1..].contains(&"#0000FF".to_string()));
}

#[test]
fn kmeans_config_also_ranks_red_first() {
    let config = ExtractConfig {
        color_count: 3,
        algorithm: Algorithm::Kmeans,
        ..ExtractConfig::default()
    };
    let swatches = extract_palette_bytes(&red_green_blue(), "image/png", &config).unwrap();
    assert_eq!(swatches[0].hex.to_string(), "#FF0000");
    assert!(swatches.len() <= 3);
}

#[test]
fn text_file_leaves_session_empty() {
    let mut controller = UploadController::new(&ExtractConfig::default()).unwrap();
    assert!(controller.select_file("notes.txt", "text/plain").is_err());
    assert_eq!(controller.state(), UploadState::Empty);
    assert_eq!(controller.status(), Status::NotAnImage);
    assert!(controller.swatches().is_empty());
}

#[test]
fn second_upload_wins_over_late_first() {
    let mut controller = UploadController::new(&ExtractConfig::default()).unwrap();
    let a = controller.select_file("a.png", "image/png").unwrap();
    let b = controller.select_file("b.bmp", "image/bmp").unwrap();

    let green = encode(1, 1, &[[0, 255, 0, 255]], ImageFormat::Bmp);
    assert_eq!(
        controller.complete_read(b, &green),
        Completion::Applied(UploadState::Ready)
    );
    assert_eq!(controller.complete_read(a, &red_green_blue()), Completion::Stale);

    assert_eq!(controller.swatches().len(), 1);
    assert_eq!(controller.swatches()[0].hex.to_string(), "#00FF00");
    assert_eq!(controller.file_name(), Some("b.bmp"));
}

#[test]
fn copy_then_clear() {
    let mut controller = UploadController::new(&ExtractConfig::default()).unwrap();
    let ticket = controller.select_file("rgb.png", "image/png").unwrap();
    controller.complete_read(ticket, &red_green_blue());
    assert_eq!(
        controller.status().to_string(),
        "Palette of 3 colors extracted successfully. Click to copy the code."
    );

    let mut clipboard = MemoryClipboard::default();
    controller.copy_swatch(0, &mut clipboard).unwrap();
    assert_eq!(clipboard.contents.as_deref(), Some("#FF0000"));
    assert_eq!(controller.status().to_string(), "#FF0000 copied!");

    controller.clear();
    assert_eq!(controller.state(), UploadState::Empty);
    assert_eq!(controller.status().to_string(), "");
    assert!(controller.palette().is_empty());
    assert!(controller.surface().is_none());
}

#[test]
fn mislabelled_bytes_report_load_error() {
    let mut controller = UploadController::new(&ExtractConfig::default()).unwrap();
    let ticket = controller.select_file("photo.jpg", "image/jpeg").unwrap();
    assert_eq!(
        controller.complete_read(ticket, b"plain text pretending to be a jpeg"),
        Completion::Applied(UploadState::Error)
    );
    assert_eq!(controller.status().to_string(), "Error loading the image.");
    assert!(controller.swatches().is_empty());
}

#[test]
fn transparent_image_still_gets_a_palette() {
    let bytes = encode(2, 1, &[[10, 20, 30, 0], [10, 20, 30, 0]], ImageFormat::Png);
    let swatches = extract_palette_bytes(&bytes, "image/png", &ExtractConfig::default()).unwrap();
    assert_eq!(swatches.len(), 1);
    assert_eq!(swatches[0].hex.to_string(), "#0A141E");
}
