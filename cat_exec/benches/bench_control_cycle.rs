//! # Control Cycle Benchmark

use std::sync::{Arc, Mutex};

use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;

use cat_lib::{
    course_reg::{self, ControlConfig, ControlMode, CourseReg},
    data_store::DataStore,
    dyn_task,
    geodesy::{self, Geodetic},
    units::Radians,
    vehicle::{self, VehicleModel},
};
use store_if::{doc::DocId, store::MemStore, DocStore};
use util::module::State;

const REF_LAT: f64 = 57.5726428059939;
const REF_LON: f64 = 11.924482585745864;

fn control_cycle_benchmark(c: &mut Criterion) {
    // ---- Regulator only ----

    let mut reg = CourseReg::default();
    let input = course_reg::InputData {
        config: ControlConfig {
            mode: ControlMode::FixedLocation(Geodetic::new(REF_LAT + 0.01, REF_LON + 0.01, 0.0)),
            dark_mode: false,
            goal_index: 0,
        },
        position: Geodetic::new(REF_LAT, REF_LON, 0.0),
        heading: Radians(0.3),
        dt_s: 0.2,
    };

    c.bench_function("course_reg_proc", |b| b.iter(|| reg.proc(&input)));

    // ---- Geodesy ----

    let reference = Geodetic::new(REF_LAT, REF_LON, 0.0);
    c.bench_function("enu_to_geodetic", |b| {
        b.iter(|| geodesy::enu_to_geodetic(250.0, -120.0, 0.0, &reference))
    });

    // ---- Full dynamics cycle over an in-memory store ----

    let store = MemStore::new();
    store
        .write(
            DocId::Settings,
            &json!({
                "controller": {
                    "type": "route",
                    "refCourse": 0,
                    "reflocation": {"latitude": REF_LAT, "longitude": REF_LON}
                },
                "rudder": {"darkMode": false, "ref": 512},
                "route": {"goalIndex": 0}
            })
            .to_string(),
        )
        .unwrap();
    store
        .write(
            DocId::Route,
            &json!({
                "geometry": {
                    "coordinates": [
                        [REF_LON + 0.01, REF_LAT + 0.01],
                        [REF_LON - 0.01, REF_LAT + 0.01],
                        [REF_LON, REF_LAT - 0.01]
                    ]
                }
            })
            .to_string(),
        )
        .unwrap();

    let mut ds = DataStore::default();
    ds.vehicle = VehicleModel::new(vehicle::Params::default(), reference);
    dyn_task::init(&mut ds, &store).unwrap();
    let shared = Arc::new(Mutex::new(None));

    c.bench_function("dyn_task_cycle", |b| {
        b.iter(|| dyn_task::run_cycle(&mut ds, &store, &shared, 0.2).unwrap())
    });
}

criterion_group!(benches, control_cycle_benchmark);
criterion_main!(benches);
