//! Undoable commands over a [`Project`](crate::Project).

pub mod atomic;
pub mod network;
pub mod platform;
pub mod unit_of_work;
pub mod world;

pub use atomic::{AtomicAdd, AtomicRemove, AtomicUpdate};
pub use network::{NetworkLayoutChangeCmd, RemoveNetworkElementsCmd};
pub use platform::{AddPlatformCmd, RemovePlatformCmd, UpdatePlatformCmd};
pub use unit_of_work::UnitOfWorkCmd;
pub use world::{ExtendWorldCmd, SetSegmentBackgroundCmd, ShrinkWorldCmd};

use crate::managers::{
    LineManager, MeanOfTransportManager, RouteManager, StopManager, VehicleManager,
    VehicleTypeManager,
};

pub type AddStopCmd = AtomicAdd<StopManager>;
pub type UpdateStopCmd = AtomicUpdate<StopManager>;
pub type RemoveStopCmd = AtomicRemove<StopManager>;
pub type UpdateStopsCmd = UnitOfWorkCmd<StopManager>;

pub type AddMeanOfTransportCmd = AtomicAdd<MeanOfTransportManager>;
pub type UpdateMeanOfTransportCmd = AtomicUpdate<MeanOfTransportManager>;
pub type RemoveMeanOfTransportCmd = AtomicRemove<MeanOfTransportManager>;
pub type UpdateMeansOfTransportCmd = UnitOfWorkCmd<MeanOfTransportManager>;

pub type AddVehicleTypeCmd = AtomicAdd<VehicleTypeManager>;
pub type UpdateVehicleTypeCmd = AtomicUpdate<VehicleTypeManager>;
pub type RemoveVehicleTypeCmd = AtomicRemove<VehicleTypeManager>;
pub type UpdateVehicleTypesCmd = UnitOfWorkCmd<VehicleTypeManager>;

pub type AddVehicleCmd = AtomicAdd<VehicleManager>;
pub type UpdateVehicleCmd = AtomicUpdate<VehicleManager>;
pub type RemoveVehicleCmd = AtomicRemove<VehicleManager>;
pub type UpdateVehiclesCmd = UnitOfWorkCmd<VehicleManager>;

pub type AddLineCmd = AtomicAdd<LineManager>;
pub type UpdateLineCmd = AtomicUpdate<LineManager>;
pub type RemoveLineCmd = AtomicRemove<LineManager>;
pub type UpdateLinesCmd = UnitOfWorkCmd<LineManager>;

pub type AddRouteCmd = AtomicAdd<RouteManager>;
pub type UpdateRouteCmd = AtomicUpdate<RouteManager>;
pub type RemoveRouteCmd = AtomicRemove<RouteManager>;
pub type UpdateRoutesCmd = UnitOfWorkCmd<RouteManager>;
