use camyuv::{
    image_to_nv21, image_to_nv21_with, packed_size, rotate_nv21, rotate_nv21_into,
    rotated_dimensions, CapturedImage, Error, OutputPolicy, Plane, Resolution, RotationWorkspace,
};

fn synthetic(width: u32, height: u32, seed: usize) -> Vec<u8> {
    (0..packed_size(width, height).unwrap())
        .map(|i| ((i * 31 + seed) % 256) as u8)
        .collect()
}

#[test]
fn test_capture_to_rotated_nv21() {
    let y: Vec<u8> = (0..8).collect();
    let u = [100u8, 101, 102, 103, 104, 105, 106, 107];
    let v = [200u8, 201, 202, 203, 204, 205, 206, 207];
    let image = CapturedImage::new(
        4,
        2,
        Plane::new(&y, 8, 1).unwrap(),
        Plane::new(&u, 4, 1).unwrap(),
        Plane::new(&v, 4, 1).unwrap(),
    );

    let frame = image_to_nv21(&image).unwrap();
    assert_eq!(frame.data.len(), 4 * 2 + 4 * 2 / 2);
    // Y row stride 8 > buffer length 8: second row is missing and padded
    assert_eq!(&frame.data[..8], &[0, 1, 2, 3, 0, 0, 0, 0]);
    assert_eq!(&frame.data[8..], &[200, 100, 201, 101]);

    let rotated = rotate_nv21(&frame.data, 4, 2, 90).unwrap();
    assert_eq!(rotated.resolution(), Resolution::new(2, 4));
    assert_eq!(rotated.data.len(), 2 * 4 + 2 * 4 / 2);
}

#[test]
fn test_round_trip_restores_frame() {
    for (w, h) in [(2, 2), (4, 2), (6, 4), (16, 10), (64, 48)] {
        let src = synthetic(w, h, w as usize);
        for (there, back) in [(90, 270), (90, -90), (270, 90), (180, 180)] {
            let rotated = rotate_nv21(&src, w, h, there).unwrap();
            let restored =
                rotate_nv21(&rotated.data, rotated.width, rotated.height, back).unwrap();
            assert_eq!(restored.resolution(), Resolution::new(w, h));
            assert_eq!(restored.data, src, "{}x{} by {} then {}", w, h, there, back);
        }
    }
}

#[test]
fn test_zero_rotation_is_copy() {
    let mut src = synthetic(8, 6, 3);
    let need = src.len();
    src.extend_from_slice(&[9; 10]);
    for degrees in [0, 360, -360, 720] {
        let out = rotate_nv21(&src, 8, 6, degrees).unwrap();
        assert_eq!(out.data, &src[..need]);
    }
}

#[test]
fn test_rotate_into_errors() {
    let src = synthetic(4, 2, 0);

    let mut small = vec![0u8; 11];
    let err = rotate_nv21_into(&src, 4, 2, 90, &mut small).unwrap_err();
    match err {
        Error::BufferTooSmall {
            required, actual, ..
        } => assert_eq!((required, actual), (12, 11)),
        other => panic!("unexpected error: {other}"),
    }

    let mut dst = vec![0u8; 64];
    let err = rotate_nv21_into(&src, 3, 2, 90, &mut dst).unwrap_err();
    assert!(matches!(err, Error::InvalidDimensions(_)));
    assert!(err.is_contract_violation());

    // Undersized destination with no rotation is still rejected
    let err = rotate_nv21_into(&src, 4, 2, 0, &mut small).unwrap_err();
    assert!(matches!(err, Error::BufferTooSmall { .. }));
}

#[test]
fn test_workspace_stream_with_size_change() {
    let mut workspace = RotationWorkspace::new();
    let sizes = [(32, 24), (32, 24), (24, 32), (32, 24)];
    for (i, (w, h)) in sizes.into_iter().enumerate() {
        let src = synthetic(w, h, i);
        let (ow, oh) = rotated_dimensions(w, h, 90);
        let mut dst = vec![0u8; packed_size(ow, oh).unwrap()];
        let res = workspace.rotate_into(&src, w, h, 90, &mut dst).unwrap();
        assert_eq!(res, Resolution::new(ow, oh));
        assert_eq!(dst, rotate_nv21(&src, w, h, 90).unwrap().data);
    }
    let stats = workspace.stats();
    assert_eq!(stats.frames_rotated, 4);
    assert_eq!(stats.source_allocations, 3);
    assert_eq!(stats.rotated_allocations, 3);

    workspace.close();
    assert!(!workspace.is_ready());
}

#[test]
fn test_output_policy_require_exact() {
    let y = [1u8; 16];
    let c = [128u8; 4];
    let image = CapturedImage::new(
        4,
        4,
        Plane::packed(&y, 4),
        Plane::packed(&c, 2),
        Plane::packed(&c, 2),
    );
    let frame = image_to_nv21_with(&image, OutputPolicy::RequireExact(vec![0u8; 24])).unwrap();
    assert_eq!(frame.data.len(), 24);

    let err = image_to_nv21_with(&image, OutputPolicy::RequireExact(vec![0u8; 30])).unwrap_err();
    assert!(matches!(err, Error::BufferSizeMismatch { .. }));
}
