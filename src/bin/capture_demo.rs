use anyhow::Result;
use slotflow::core::{Frame, ProcessingNode};
use slotflow::hal::{CaptureTarget, MockVideoBackend};
use slotflow::nodes::{ImShow, VideoCapture};
use slotflow::registry;
use slotflow::ManagedNode;

/// A few synthetic frames so the demo runs without a video file.
fn gradient_frames(count: u8) -> Vec<Frame> {
    (0..count)
        .map(|i| {
            let mut frame = Frame::new(32, 24, 3);
            for (j, byte) in frame.data.iter_mut().enumerate() {
                *byte = (j as u8).wrapping_mul(i + 1);
            }
            frame
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("slotflow - capture/display demo");
    println!("===============================\n");

    let video_file = std::env::var("SLOTFLOW_VIDEO_FILE").unwrap_or_default();
    let config = serde_json::json!({
        "capture": {
            "video_device": 0,
            "video_file": video_file
        },
        "display": {
            "name": "preview",
            "waitKey": 1,
            "autoSize": true
        }
    });

    // Reference the node types so their registrations are linked in.
    let _ = (ImShow::default(), VideoCapture::default());

    println!("Registered node types:");
    for meta in registry::all() {
        let description = meta.describe()?;
        println!("  {} - {}", description.name, description.doc);
        for param in description.parameters {
            println!("    {} [{}] {}", param.name, param.type_name, param.doc);
        }
    }
    println!();

    let capture_node: Box<dyn ProcessingNode> = if video_file.is_empty() {
        let backend = MockVideoBackend::new()
            .with_stream(CaptureTarget::Device(0), gradient_frames(5));
        Box::new(VideoCapture::with_backend(backend))
    } else {
        Box::new(VideoCapture::default())
    };

    let mut capture = ManagedNode::new("capture", capture_node);
    capture.declare_params()?;
    capture.load_params_json(&config["capture"])?;
    capture.configure()?;

    let mut display = ManagedNode::from_registry("display", "imshow")?;
    display.declare_params()?;
    display.load_params_json(&config["display"])?;
    display.configure()?;

    println!("capture outputs:\n{}", capture.outputs());
    println!("display inputs:\n{}", display.inputs());

    loop {
        capture.process()?;
        let frame_number = *capture.outputs().get::<i32>("frame_number")?;
        let frame = capture.outputs().get::<Frame>("out")?;
        if frame.is_empty() {
            println!("end of stream at call {}", frame_number);
            break;
        }

        display.inputs_mut()?.set("input", frame.clone())?;
        display.process()?;
        let key = *display.outputs().get::<i32>("out")?;
        println!(
            "frame {}: {}x{}x{}, key {}",
            frame_number, frame.width, frame.height, frame.channels, key
        );
    }

    println!();
    for metrics in [capture.metrics(), display.metrics()] {
        println!("{}", serde_json::to_string(&metrics.snapshot())?);
    }

    Ok(())
}
