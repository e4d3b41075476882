use crate::core::{Frame, NodeError, ProcessingNode, Tendrils};
use crate::hal::{DisplayBackend, HeadlessDisplay};
use anyhow::Result;
use slotflow_macros::RegisterNode;

/// Display sink: shows the `input` frame in a named window and reports the
/// key pressed, if it was asked to wait for one.
#[derive(RegisterNode)]
#[node_meta(name = "imshow", doc = "Shows an image in a named window.")]
pub struct ImShow {
    display: Box<dyn DisplayBackend>,
    window_name: String,
    wait_key: i32,
    auto_size: bool,
}

impl Default for ImShow {
    fn default() -> Self {
        Self::with_display(HeadlessDisplay::new())
    }
}

impl ImShow {
    pub fn with_display(display: impl DisplayBackend + 'static) -> Self {
        Self {
            display: Box::new(display),
            window_name: "image".to_string(),
            wait_key: -1,
            auto_size: true,
        }
    }
}

impl ProcessingNode for ImShow {
    fn declare_params(&mut self, params: &mut Tendrils) -> Result<()> {
        params.declare_with_default::<String>("name", "The window name", "image".to_string())?;
        params.declare_with_default::<i32>(
            "waitKey",
            "Number of millis to wait, -1 for not at all, 0 for infinity.",
            -1,
        )?;
        params.declare_with_default::<bool>("autoSize", "Autosize the window.", true)?;
        Ok(())
    }

    fn configure(
        &mut self,
        params: &Tendrils,
        inputs: &mut Tendrils,
        outputs: &mut Tendrils,
    ) -> Result<()> {
        self.window_name = params.get::<String>("name")?.clone();
        self.wait_key = *params.get::<i32>("waitKey")?;
        self.auto_size = *params.get::<bool>("autoSize")?;

        inputs.declare::<Frame>("input", "The image to show")?;
        outputs.declare::<i32>("out", "Character pressed.")?;
        Ok(())
    }

    fn process(&mut self, _params: &Tendrils, inputs: &Tendrils, outputs: &mut Tendrils) -> Result<()> {
        let image = inputs.get::<Frame>("input")?;
        if image.is_empty() {
            outputs.set::<i32>("out", 0)?;
            return Err(NodeError::EmptyInput {
                slot: "input".to_string(),
            }
            .into());
        }

        if self.auto_size {
            self.display.named_window(&self.window_name, true)?;
        }
        self.display.show(&self.window_name, image)?;

        let key = if self.wait_key >= 0 {
            // "No key" is -1, which masks to 255.
            0xff & self.display.wait_key(self.wait_key)?.unwrap_or(-1)
        } else {
            0
        };
        outputs.set::<i32>("out", key)?;
        Ok(())
    }
}
