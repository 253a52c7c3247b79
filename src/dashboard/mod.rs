mod controller;

pub use controller::{
    ChangeAlert, DashboardController, DashboardView, LatestView, MoveInTag, PropertyCard,
};
