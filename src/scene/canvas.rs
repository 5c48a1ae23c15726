use crate::{
    foundation::error::{SwatchError, SwatchResult},
    scene::model::SceneDocument,
};

/// Canvas data persisted on a template: one face, or a front/back pair.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum CanvasData {
    /// Two-sided product.
    Sides {
        /// Front face.
        front: SceneDocument,
        /// Back face, when the product has one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        back: Option<SceneDocument>,
    },
    /// Single-sided product.
    Single(SceneDocument),
}

impl CanvasData {
    /// Parse persisted JSON and validate every side.
    pub fn from_json(s: &str) -> SwatchResult<Self> {
        let data: Self = serde_json::from_str(s)
            .map_err(|e| SwatchError::validation(format!("parse canvas data JSON: {e}")))?;
        data.validate()?;
        Ok(data)
    }

    /// Serialize, assigning default z-indices on every side.
    pub fn to_json(&self) -> SwatchResult<String> {
        Ok(serde_json::to_string(&self.with_default_z_indices())?)
    }

    /// Copy with default z-indices assigned on every side.
    pub fn with_default_z_indices(&self) -> Self {
        self.map_sides(SceneDocument::with_default_z_indices)
    }

    /// Validate every side.
    pub fn validate(&self) -> SwatchResult<()> {
        for doc in self.sides() {
            doc.validate()?;
        }
        Ok(())
    }

    /// Face used for thumbnails.
    pub fn front(&self) -> &SceneDocument {
        match self {
            Self::Sides { front, .. } => front,
            Self::Single(doc) => doc,
        }
    }

    /// Every side, front first.
    pub fn sides(&self) -> Vec<&SceneDocument> {
        match self {
            Self::Sides { front, back } => std::iter::once(front).chain(back.as_ref()).collect(),
            Self::Single(doc) => vec![doc],
        }
    }

    /// Apply `f` to every side, keeping the shape.
    pub fn map_sides(&self, mut f: impl FnMut(&SceneDocument) -> SceneDocument) -> Self {
        match self {
            Self::Sides { front, back } => Self::Sides {
                front: f(front),
                back: back.as_ref().map(&mut f),
            },
            Self::Single(doc) => Self::Single(f(doc)),
        }
    }

    /// Fallible form of [`CanvasData::map_sides`].
    pub fn try_map_sides(
        &self,
        mut f: impl FnMut(&SceneDocument) -> SwatchResult<SceneDocument>,
    ) -> SwatchResult<Self> {
        Ok(match self {
            Self::Sides { front, back } => Self::Sides {
                front: f(front)?,
                back: back.as_ref().map(&mut f).transpose()?,
            },
            Self::Single(doc) => Self::Single(f(doc)?),
        })
    }

    /// Reject a replacement whose sides change canvas dimensions.
    pub fn ensure_same_dimensions(&self, previous: &CanvasData) -> SwatchResult<()> {
        let now = self.sides();
        let before = previous.sides();
        if now.len() != before.len() {
            return Err(SwatchError::validation(
                "canvas data cannot add or remove a side",
            ));
        }
        for (a, b) in now.into_iter().zip(before) {
            a.ensure_same_dimensions(b)?;
        }
        Ok(())
    }

    /// Same canvas with the front face's product photograph replaced.
    pub fn with_base_image(&self, url: &str) -> CanvasData {
        let mut out = self.clone();
        match &mut out {
            Self::Sides { front, .. } => front.assets.base_image = url.to_string(),
            Self::Single(doc) => doc.assets.base_image = url.to_string(),
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/canvas.rs"]
mod tests;
