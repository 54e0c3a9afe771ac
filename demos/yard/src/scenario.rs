//! The construction yard: a 40×16 map with four storage areas, loose
//! materials, and three workers.
//!
//! ```text
//!  z
//! 15  . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . 2
//! 12  D D D . . . . . . . . . . . . . . . . . ~ ~ . . . . . . . . . . . F F . . . .
//!  8  1 . . . . . . . . . . . . . . . . . . . ~ ~ . . . . . . . . . . . . . . . .
//!  5  . . . . . . . . . . . . . . Y Y Y Y . . ~ ~ . . . . . . . . . . . . . . . .
//!  2  . . . . . . . . . . . . . . Y Y Y Y . . ~ ~ . . . . . . S S . . . . . . . .
//!  0  0 . . . . . . . . . . . . . . . . . . . ~ ~ . . . . . . . . . . . . . . . .
//!     x=0                                    x=20                              x=39
//! ```
//!
//! `D` dump (low), `Y` yard (normal), `S` shed (important, wood only),
//! `F` freezer (preferred building), `~` mud (slow but passable).

use anyhow::Result;

use er_core::{AgentId, Cell, ItemKind};
use er_spatial::PassGridBuilder;
use er_storage::{Acceptance, GroupKind, StorageMapBuilder, StoragePriority};
use er_sim::{Task, World};

pub const STONE: ItemKind = ItemKind(1);
pub const WOOD:  ItemKind = ItemKind(2);
pub const STEEL: ItemKind = ItemKind(3);

const WIDTH:  u32 = 40;
const HEIGHT: u32 = 16;

pub fn kind_name(kind: ItemKind) -> &'static str {
    match kind {
        STONE => "stone",
        WOOD  => "wood",
        STEEL => "steel",
        _     => "unknown",
    }
}

/// Build the world and the initial task list.
pub fn build_yard() -> Result<(World, Vec<(AgentId, Task)>)> {
    // ── Storage ───────────────────────────────────────────────────────────
    let mut b = StorageMapBuilder::new();
    b.add_stockpile("dump", StoragePriority::Low, StorageMapBuilder::rect(0, 12, 2, 14));
    b.add_stockpile("yard", StoragePriority::Normal, StorageMapBuilder::rect(14, 2, 17, 5));
    b.add_group(
        "shed",
        StoragePriority::Important,
        GroupKind::Building { def: "shed".into() },
        Acceptance::only([WOOD]),
        StorageMapBuilder::rect(30, 2, 31, 3),
    );
    b.add_group(
        "freezer",
        StoragePriority::Preferred,
        GroupKind::Building { def: "freezer".into() },
        Acceptance::All,
        StorageMapBuilder::rect(34, 12, 35, 13),
    );
    b.stack_limit(STEEL, 20);
    let storage = b.build()?;

    // ── Terrain ───────────────────────────────────────────────────────────
    let mut g = PassGridBuilder::new(WIDTH, HEIGHT);
    for z in 0..HEIGHT as i32 {
        g.cost(Cell::new(20, z), 3.0)?;
        g.cost(Cell::new(21, z), 3.0)?;
    }
    let grid = g.build();

    let mut world = World::new(storage, grid);

    // ── Workers ───────────────────────────────────────────────────────────
    let mason  = world.add_agent(Cell::new(0, 0), 75.0);
    let porter = world.add_agent(Cell::new(0, 8), 75.0);
    let joiner = world.add_agent(Cell::new(39, 15), 75.0);

    // ── Loose materials ───────────────────────────────────────────────────
    for (x, z) in [(6, 1), (8, 3), (11, 2), (24, 6)] {
        world.add_item(STONE, Cell::new(x, z), 10, 1.0)?;
    }
    for (x, z) in [(7, 8), (12, 9), (25, 12), (28, 4)] {
        world.add_item(WOOD, Cell::new(x, z), 15, 0.5)?;
    }
    world.add_item(STEEL, Cell::new(9, 13), 8, 2.0)?;

    // Already stored, low priority: the porter's delivery.
    let girder = world.add_item(STEEL, Cell::new(1, 13), 6, 2.0)?;
    world.add_item(WOOD, Cell::new(0, 12), 10, 0.5)?;

    let tasks = vec![
        (mason, Task::construct(Cell::new(36, 4), 10)),
        (mason, Task::construct(Cell::new(10, 14), 5)),
        (porter, Task::carry(girder, Cell::new(33, 8))),
        (porter, Task::construct(Cell::new(33, 8), 6)),
        (joiner, Task::construct(Cell::new(3, 3), 8)),
    ];
    Ok((world, tasks))
}
