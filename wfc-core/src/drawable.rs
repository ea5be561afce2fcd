use crate::grid::Grid;
use crate::StateId;
use wfc_rules::AssetHandle;

/// Consumer of a finished grid.
///
/// The solver only ever sends one result and asks for it to be drawn; what
/// "drawing" means is up to the implementor.
pub trait GridDrawable {
    /// Error produced while drawing.
    type Error;

    /// Receives the final state of every cell and the asset of every state.
    ///
    /// `assets` has one more entry than there are states: the last id means
    /// "no tile" (outside the mask, or never collapsed) and maps to `None`.
    fn send_tiles(&mut self, states: Grid<StateId>, assets: Vec<Option<AssetHandle>>);

    /// Renders whatever was last sent.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn draw_tiles(&mut self) -> Result<(), Self::Error>;
}

impl<T: GridDrawable + ?Sized> GridDrawable for Box<T> {
    type Error = T::Error;

    fn send_tiles(&mut self, states: Grid<StateId>, assets: Vec<Option<AssetHandle>>) {
        (**self).send_tiles(states, assets);
    }

    fn draw_tiles(&mut self) -> Result<(), Self::Error> {
        (**self).draw_tiles()
    }
}
