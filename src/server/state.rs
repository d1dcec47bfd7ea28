use crate::aggregate::Georcoder;

pub struct AppState {
    pub georcoder: Georcoder,
}
