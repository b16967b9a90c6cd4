use super::*;
use crate::morph::points::image_corners;
use crate::raster::image::Channels;

fn solid(w: u32, h: u32, rgb: [u8; 3]) -> Image {
    Image::filled(w, h, &rgb).unwrap()
}

fn gradient(w: u32, h: u32) -> Image {
    let mut data = Vec::with_capacity((w * h * 3) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[(x * 3 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8]);
        }
    }
    Image::new(w, h, Channels::Rgb, data).unwrap()
}

fn with_center(w: u32, h: u32, c: (f64, f64)) -> Vec<Point> {
    let mut v = image_corners(w, h).to_vec();
    v.push(Point::new(c.0, c.1));
    v
}

#[test]
fn midpoint_of_red_and_blue_is_purple() {
    let a = solid(100, 100, [255, 0, 0]);
    let b = solid(100, 100, [0, 0, 255]);
    let pts = image_corners(100, 100).to_vec();
    let m = MorphBlender::prepare(&a, &pts, &b, &pts).unwrap();
    assert_eq!(m.triangulation().len(), 2);

    let mid = m.render(0.5).unwrap();
    for y in 0..100 {
        for x in 0..100 {
            assert_eq!(mid.pixel(x, y), &[128, 0, 128]);
        }
    }
}

#[test]
fn endpoints_reproduce_source_images() {
    let a = gradient(64, 48);
    let b = solid(64, 48, [10, 200, 30]);
    let m = MorphBlender::prepare(
        &a,
        &with_center(64, 48, (20.0, 20.0)),
        &b,
        &with_center(64, 48, (40.0, 30.0)),
    )
    .unwrap();
    assert_eq!(m.render(0.0).unwrap(), a);
    assert_eq!(m.render(1.0).unwrap(), b);
}

#[test]
fn feature_stripes_meet_halfway() {
    // Start has a stripe at x = 16, end at x = 32; halfway both warp onto x = 24.
    let (w, h) = (64u32, 32u32);
    let stripe = |sx: u32| {
        let mut data = vec![0u8; (w * h * 3) as usize];
        for y in 0..h {
            let i = ((y * w + sx) * 3) as usize;
            data[i..i + 3].copy_from_slice(&[255, 255, 255]);
        }
        Image::new(w, h, Channels::Rgb, data).unwrap()
    };
    let (a, b) = (stripe(16), stripe(32));

    let mut sp = image_corners(w, h).to_vec();
    sp.extend([Point::new(16.0, 0.0), Point::new(16.0, 31.0)]);
    let mut ep = image_corners(w, h).to_vec();
    ep.extend([Point::new(32.0, 0.0), Point::new(32.0, 31.0)]);

    let m = MorphBlender::prepare(&a, &sp, &b, &ep).unwrap();
    let out = m.render(0.5).unwrap();
    for y in 0..h {
        assert_eq!(out.pixel(24, y), &[255, 255, 255], "row {y}");
        assert_eq!(out.pixel(16, y), &[0, 0, 0], "row {y}");
        assert_eq!(out.pixel(32, y), &[0, 0, 0], "row {y}");
    }
}

#[test]
fn every_pixel_is_owned_by_a_triangle() {
    let (w, h) = (40u32, 30u32);
    let a = gradient(w, h);
    let mut sp = with_center(w, h, (12.0, 9.0));
    sp.push(Point::new(30.0, 20.0));
    let mut ep = with_center(w, h, (15.0, 14.0));
    ep.push(Point::new(25.0, 22.0));
    let m = MorphBlender::prepare(&a, &sp, &a, &ep).unwrap();

    for t in [0.0, 0.3, 0.5, 1.0] {
        let maps = m.triangle_maps(t);
        let mut owner = vec![NO_OWNER; (w * h) as usize];
        fill_owner_map(&mut owner, &maps, w, h);
        assert!(owner.iter().all(|&o| o != NO_OWNER), "t = {t}");
    }
}

#[test]
fn color_switch_without_cross_dissolve() {
    let a = solid(20, 20, [255, 0, 0]);
    let b = solid(20, 20, [0, 255, 0]);
    let pts = image_corners(20, 20).to_vec();
    let m = MorphBlender::prepare(&a, &pts, &b, &pts).unwrap().with_cross_dissolve(false);
    assert_eq!(m.render(0.49).unwrap().pixel(5, 5), &[255, 0, 0]);
    assert_eq!(m.render(0.5).unwrap().pixel(5, 5), &[0, 255, 0]);
}

#[test]
fn mismatched_channels_promote_to_rgba() {
    let a = solid(10, 10, [255, 0, 0]);
    let b = Image::filled(10, 10, &[0, 0, 255, 255]).unwrap();
    let pts = image_corners(10, 10).to_vec();
    let m = MorphBlender::prepare(&a, &pts, &b, &pts).unwrap();
    let out = m.render(0.5).unwrap();
    assert_eq!(out.channels(), Channels::Rgba);
    assert_eq!(out.pixel(3, 3), &[128, 0, 128, 255]);
}

#[test]
fn dimension_mismatch_is_validation_error() {
    let a = solid(10, 10, [0, 0, 0]);
    let b = solid(12, 10, [0, 0, 0]);
    let err = MorphBlender::prepare(
        &a,
        &image_corners(10, 10),
        &b,
        &image_corners(10, 10),
    )
    .unwrap_err();
    assert!(matches!(err, WarpmorphError::Validation(_)));
}

#[test]
fn point_count_mismatch_is_validation_error() {
    let a = solid(10, 10, [0, 0, 0]);
    let sp = with_center(10, 10, (4.0, 4.0));
    let mut ep = sp.clone();
    ep.push(Point::new(6.0, 2.0));
    let err = MorphBlender::prepare(&a, &sp, &a, &ep).unwrap_err();
    assert!(matches!(err, WarpmorphError::Validation(_)));
}

#[test]
fn triangulation_size_must_match_points() {
    let a = solid(10, 10, [0, 0, 0]);
    let pts = image_corners(10, 10).to_vec();
    let tri = Arc::new(Triangulation::from_triangles(vec![[0, 1, 2]], 3).unwrap());
    assert!(MorphBlender::new(&a, &pts, &a, &pts, tri).is_err());
}

#[test]
fn t_outside_unit_range_is_rejected() {
    let a = solid(10, 10, [0, 0, 0]);
    let pts = image_corners(10, 10).to_vec();
    let m = MorphBlender::prepare(&a, &pts, &a, &pts).unwrap();
    assert!(m.render(1.5).is_err());
    assert!(m.render(f64::NAN).is_err());
}

#[test]
fn pooled_render_recycles_owner_map() {
    let a = gradient(16, 16);
    let pts = with_center(16, 16, (8.0, 8.0));
    let m = MorphBlender::prepare(&a, &pts, &a, &pts).unwrap();
    let mut pool = BufferPool::default();
    let first = m.render_pooled(0.25, &mut pool).unwrap();
    let second = m.render_pooled(0.25, &mut pool).unwrap();
    assert_eq!(first, second);
    assert_eq!(pool.stats().alloc_buffers, 1);
}
