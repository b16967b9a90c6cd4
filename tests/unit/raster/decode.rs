use super::*;

fn png_bytes(img: &image::DynamicImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decode_rgb_png_keeps_three_channels() {
    let src = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        3,
        2,
        image::Rgb([10, 20, 30]),
    ));
    let img = decode_image(&png_bytes(&src)).unwrap();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.channels(), Channels::Rgb);
    assert_eq!(img.pixel(2, 1), &[10, 20, 30]);
}

#[test]
fn decode_rgba_png_keeps_alpha() {
    let src = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        1,
        1,
        image::Rgba([1, 2, 3, 4]),
    ));
    let img = decode_image(&png_bytes(&src)).unwrap();
    assert_eq!(img.channels(), Channels::Rgba);
    assert_eq!(img.pixel(0, 0), &[1, 2, 3, 4]);
}

#[test]
fn garbage_bytes_are_a_resource_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, WarpmorphError::Resource(_)));
}

#[test]
fn resize_changes_dimensions_and_keeps_solid_color() {
    let img = Image::filled(4, 4, &[200, 100, 50]).unwrap();
    let out = resize_image(&img, 8, 6).unwrap();
    assert_eq!(out.dimensions(), (8, 6));
    for (got, want) in out.pixel(7, 5).iter().zip([200u8, 100, 50]) {
        assert!(got.abs_diff(want) <= 1);
    }
}

#[test]
fn resize_to_same_size_is_identity() {
    let img = Image::filled(4, 4, &[1, 2, 3]).unwrap();
    assert_eq!(resize_image(&img, 4, 4).unwrap(), img);
    assert!(resize_image(&img, 0, 4).is_err());
}
