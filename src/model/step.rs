use std::fmt;
use std::sync::Arc;

use crate::foundation::error::{TourError, TourResult};
use crate::foundation::math::is_finite_non_negative;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Side of the spot where the tooltip is placed.
pub enum Position {
    /// Above the spot.
    Top,
    /// Below the spot.
    Bottom,
    /// Left of the spot.
    Left,
    /// Right of the spot.
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Cut-out shape of the mask.
pub enum Shape {
    /// Circle enclosing the target.
    #[default]
    Spotlight,
    /// Padded, optionally rounded rectangle around the target.
    Rectangle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Horizontal anchor for tooltips placed above or below the spot.
pub enum AlignTo {
    /// Center on the spot.
    #[default]
    Spot,
    /// Center in the viewport.
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// How the overlay travels between steps.
pub enum Motion {
    /// The cut-out moves continuously from the old spot to the new one.
    #[default]
    Sliding,
    /// The overlay fades out at the old spot and back in at the new one.
    Fading,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Padding and corner rounding applied around the measured target.
pub struct ShapeProperties {
    /// Padding on every side of a rectangle cut-out.
    #[serde(default)]
    pub border_width: f64,
    /// Horizontal corner radius of a rectangle cut-out.
    #[serde(default)]
    pub horizontal_radius: f64,
    /// Vertical corner radius of a rectangle cut-out.
    #[serde(default)]
    pub vertical_radius: f64,
}

impl ShapeProperties {
    /// Reject negative or non-finite values.
    pub fn validate(&self) -> TourResult<()> {
        for (name, v) in [
            ("border_width", self.border_width),
            ("horizontal_radius", self.horizontal_radius),
            ("vertical_radius", self.vertical_radius),
        ] {
            if !is_finite_non_negative(v) {
                return Err(TourError::validation(format!(
                    "shape_properties.{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Inputs handed to a step's tooltip renderer.
pub struct TipProps {
    /// Index of the active step.
    pub current_index: usize,
    /// Number of steps in the tour.
    pub step_count: usize,
    /// Whether the active step is the first one.
    pub is_first: bool,
    /// Whether the active step is the last one.
    pub is_last: bool,
}

impl TipProps {
    /// Props for step `index` of a tour with `step_count` steps.
    pub fn new(index: usize, step_count: usize) -> Self {
        Self {
            current_index: index,
            step_count,
            is_first: index == 0,
            is_last: index + 1 >= step_count,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Navigation requested from inside a tooltip.
pub enum TipAction {
    /// Advance; stops the tour at the last step.
    Next,
    /// Go back one step.
    Previous,
    /// End the tour.
    Stop,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// Rendered tooltip content.
pub struct TipContent {
    /// Heading line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Buttons in display order, each with its label.
    pub actions: Vec<(TipAction, String)>,
}

/// Tooltip renderer capability supplied by presentation code.
pub type RenderFn = Arc<dyn Fn(&TipProps) -> TipContent + Send + Sync>;

#[derive(Clone, serde::Serialize, serde::Deserialize)]
/// One stop on the tour.
pub struct Step {
    /// Side of the spot the tooltip sits on.
    pub position: Position,
    /// Cut-out shape.
    #[serde(default)]
    pub shape: Shape,
    /// Horizontal alignment for top/bottom tooltips.
    #[serde(default)]
    pub align_to: AlignTo,
    /// Transition style into this step.
    #[serde(default)]
    pub motion: Motion,
    /// Padding/rounding around the target.
    #[serde(default)]
    pub shape_properties: ShapeProperties,
    /// Tooltip heading used by the default renderer.
    #[serde(default)]
    pub title: String,
    /// Tooltip body used by the default renderer.
    #[serde(default)]
    pub text: String,
    /// Custom tooltip renderer; replaces the default one.
    #[serde(skip)]
    pub render: Option<RenderFn>,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("position", &self.position)
            .field("shape", &self.shape)
            .field("align_to", &self.align_to)
            .field("motion", &self.motion)
            .field("shape_properties", &self.shape_properties)
            .field("title", &self.title)
            .field("text", &self.text)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Step {
    /// A step with default shape, alignment and motion.
    pub fn new(position: Position) -> Self {
        Self {
            position,
            shape: Shape::default(),
            align_to: AlignTo::default(),
            motion: Motion::default(),
            shape_properties: ShapeProperties::default(),
            title: String::new(),
            text: String::new(),
            render: None,
        }
    }

    #[must_use]
    /// Set the cut-out shape.
    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    /// Set the horizontal alignment.
    pub fn align_to(mut self, align_to: AlignTo) -> Self {
        self.align_to = align_to;
        self
    }

    #[must_use]
    /// Set the motion style.
    pub fn motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    #[must_use]
    /// Set padding and corner radii.
    pub fn shape_properties(mut self, props: ShapeProperties) -> Self {
        self.shape_properties = props;
        self
    }

    #[must_use]
    /// Set default-renderer text.
    pub fn text(mut self, title: impl Into<String>, text: impl Into<String>) -> Self {
        self.title = title.into();
        self.text = text.into();
        self
    }

    #[must_use]
    /// Install a custom tooltip renderer.
    pub fn render<F>(mut self, f: F) -> Self
    where
        F: Fn(&TipProps) -> TipContent + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(f));
        self
    }

    /// Render this step's tooltip content.
    pub fn render_tip(&self, props: &TipProps) -> TipContent {
        match &self.render {
            Some(render) => render(props),
            None => default_tip(&self.title, &self.text, props),
        }
    }

    /// Validate the numeric configuration.
    pub fn validate(&self) -> TourResult<()> {
        self.shape_properties.validate()
    }
}

fn default_tip(title: &str, body: &str, props: &TipProps) -> TipContent {
    let mut actions = Vec::with_capacity(3);
    if !props.is_first {
        actions.push((TipAction::Previous, "Previous".to_owned()));
    }
    if props.is_last {
        actions.push((TipAction::Next, "Finish".to_owned()));
    } else {
        actions.push((TipAction::Next, "Next".to_owned()));
        actions.push((TipAction::Stop, "Skip".to_owned()));
    }
    TipContent {
        title: title.to_owned(),
        body: body.to_owned(),
        actions,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/step.rs"]
mod tests;
