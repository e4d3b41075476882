use slotflow::core::{error_kind, ErrorKind, Frame, NodeError, ProcessingNode, Tendrils};
use slotflow::hal::{netpbm, CaptureTarget, MockVideoBackend};
use slotflow::nodes::VideoCapture;
use slotflow::ManagedNode;
use std::io::Write;
use std::path::PathBuf;

fn managed(backend: MockVideoBackend, params: serde_json::Value) -> ManagedNode {
    let mut node = ManagedNode::new("capture", Box::new(VideoCapture::with_backend(backend)));
    node.declare_params().unwrap();
    node.load_params_json(&params).unwrap();
    node.configure().unwrap();
    node
}

fn black_frames(count: usize) -> Vec<Frame> {
    (0..count).map(|_| Frame::new(10, 10, 3)).collect()
}

#[test]
fn test_single_black_frame() {
    let backend = MockVideoBackend::new().with_stream(CaptureTarget::Device(0), black_frames(1));
    let mut node = managed(backend, serde_json::json!({"video_file": "", "video_device": 0}));

    node.process().unwrap();

    let out = node.outputs().get::<Frame>("out").unwrap();
    assert_eq!(*out, Frame::new(10, 10, 3));
    assert_eq!(*node.outputs().get::<i32>("frame_number").unwrap(), 1);
}

#[test]
fn test_frame_number_counts_calls_past_end_of_stream() {
    let backend = MockVideoBackend::new().with_stream(CaptureTarget::Device(0), black_frames(3));
    let mut node = managed(backend, serde_json::json!({}));

    for call in 1..=5 {
        node.process().unwrap();
        assert_eq!(*node.outputs().get::<i32>("frame_number").unwrap(), call);

        let out = node.outputs().get::<Frame>("out").unwrap();
        if call <= 3 {
            assert!(!out.is_empty(), "call {} should yield a frame", call);
        } else {
            assert!(out.is_empty(), "call {} is past the end of the stream", call);
        }
    }
}

#[test]
fn test_device_index_reaches_open_attempt() {
    let backend = MockVideoBackend::new().with_stream(CaptureTarget::Device(5), black_frames(1));
    let handle = backend.clone();
    let mut node = managed(backend, serde_json::json!({"video_device": 5, "video_file": ""}));

    node.process().unwrap();
    assert_eq!(handle.open_attempts(), vec![CaptureTarget::Device(5)]);
}

#[test]
fn test_file_takes_precedence_over_device() {
    let file = CaptureTarget::File(PathBuf::from("clip.ppm"));
    let backend = MockVideoBackend::new()
        .with_stream(file.clone(), black_frames(1))
        .with_stream(CaptureTarget::Device(2), black_frames(1));
    let handle = backend.clone();
    let mut node = managed(
        backend,
        serde_json::json!({"video_device": 2, "video_file": "clip.ppm"}),
    );

    node.process().unwrap();
    assert_eq!(handle.open_attempts(), vec![file]);
}

#[test]
fn test_source_opened_once() {
    let backend = MockVideoBackend::new().with_stream(CaptureTarget::Device(0), black_frames(4));
    let handle = backend.clone();
    let mut node = managed(backend, serde_json::json!({}));

    for _ in 0..4 {
        node.process().unwrap();
    }
    assert_eq!(handle.open_attempts().len(), 1);
}

#[test]
fn test_open_failure_carries_target() {
    let backend = MockVideoBackend::new();
    let handle = backend.clone();
    let mut node = managed(backend, serde_json::json!({"video_device": 7}));

    let err = node.process().unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::DeviceOpenFailure));
    match err.downcast_ref::<NodeError>() {
        Some(NodeError::DeviceOpenFailure { target, .. }) => {
            assert_eq!(*target, CaptureTarget::Device(7))
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("video device 7"));

    // Not fatal: the host may retry, and the node tries to open again.
    assert!(node.process().is_err());
    assert_eq!(handle.open_attempts().len(), 2);
    assert_eq!(*node.outputs().get::<i32>("frame_number").unwrap(), 0);
}

#[test]
fn test_read_failure_empties_frame_and_counts() {
    let backend = MockVideoBackend::new().with_stream(CaptureTarget::Device(0), black_frames(2));
    backend.fail_reads(true);
    let mut node = managed(backend, serde_json::json!({}));

    node.process().unwrap();
    assert!(node.outputs().get::<Frame>("out").unwrap().is_empty());
    assert_eq!(*node.outputs().get::<i32>("frame_number").unwrap(), 1);
}

#[test]
fn test_output_storage_reused_between_frames() {
    let frames = vec![
        Frame::from_data(2, 1, 1, vec![1, 2]).unwrap(),
        Frame::from_data(2, 1, 1, vec![3, 4]).unwrap(),
    ];
    let backend = MockVideoBackend::new().with_stream(CaptureTarget::Device(0), frames);
    let mut capture = VideoCapture::with_backend(backend);

    let mut params = Tendrils::new();
    let (mut inputs, mut outputs) = (Tendrils::new(), Tendrils::new());
    capture.declare_params(&mut params).unwrap();
    capture.configure(&params, &mut inputs, &mut outputs).unwrap();

    capture.process(&params, &inputs, &mut outputs).unwrap();
    let first_ptr = outputs.get::<Frame>("out").unwrap().data.as_ptr();
    capture.process(&params, &inputs, &mut outputs).unwrap();
    let out = outputs.get::<Frame>("out").unwrap();

    assert_eq!(out.data, vec![3, 4]);
    assert_eq!(out.data.as_ptr(), first_ptr);
}

#[test]
fn test_reads_netpbm_file_with_default_backend() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for shade in [0u8, 128, 255] {
        let frame = Frame::from_data(4, 2, 1, vec![shade; 8]).unwrap();
        file.write_all(&netpbm::encode(&frame).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let mut node = ManagedNode::new("capture", Box::new(VideoCapture::default()));
    node.declare_params().unwrap();
    node.set_param("video_file", file.path().display().to_string())
        .unwrap();
    node.configure().unwrap();

    for shade in [0u8, 128, 255] {
        node.process().unwrap();
        let out = node.outputs().get::<Frame>("out").unwrap();
        assert_eq!(out.data, vec![shade; 8]);
    }
    node.process().unwrap();
    assert!(node.outputs().get::<Frame>("out").unwrap().is_empty());
    assert_eq!(*node.outputs().get::<i32>("frame_number").unwrap(), 4);
}

#[test]
fn test_default_backend_has_no_cameras() {
    let mut node = ManagedNode::new("capture", Box::new(VideoCapture::default()));
    node.declare_params().unwrap();
    node.configure().unwrap();

    let err = node.process().unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::DeviceOpenFailure));
}

#[test]
fn test_oversized_netpbm_frame_reads_as_empty() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"P6\n4294967295 4294967295\n255\n\x00").unwrap();
    file.flush().unwrap();

    let mut node = ManagedNode::new("capture", Box::new(VideoCapture::default()));
    node.declare_params().unwrap();
    node.set_param("video_file", file.path().display().to_string())
        .unwrap();
    node.configure().unwrap();

    node.process().unwrap();
    assert!(node.outputs().get::<Frame>("out").unwrap().is_empty());
    assert_eq!(*node.outputs().get::<i32>("frame_number").unwrap(), 1);
}
