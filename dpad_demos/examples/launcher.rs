// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A game launcher driven by a remote: a row of systems, then a grid of games.
//!
//! This example shows how a presentation layer uses `dpad_dispatcher`:
//! - tiles mount before their container, so they register against a parent
//!   key that does not exist yet and are linked when it arrives,
//! - the container focuses itself once its data is "loaded",
//! - tile `on_focus` callbacks scroll the container to the tile,
//! - enter on a system switches screens by unregistering one tree and
//!   registering the next.
//!
//! Run:
//! - `cargo run -p dpad_demos --example launcher`
//! - `RUST_LOG=dpad_dispatcher=debug cargo run -p dpad_demos --example launcher`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dpad_dispatcher::{Dispatcher, InitOptions, KeyMap, NodeConfig, Outcome};
use kurbo::{Point, Rect};
use tracing_subscriber::EnvFilter;

/// A console shown on the home screen.
#[derive(Clone, Copy, Debug)]
struct System {
    id: &'static str,
    name: &'static str,
    games: usize,
}

const SYSTEMS: &[System] = &[
    System { id: "nes", name: "Nintendo Entertainment System", games: 9 },
    System { id: "snes", name: "Super Nintendo", games: 11 },
    System { id: "genesis", name: "Sega Genesis", games: 7 },
    System { id: "psx", name: "PlayStation", games: 10 },
    System { id: "n64", name: "Nintendo 64", games: 6 },
];

const TILE: f64 = 300.0;
const GAP: f64 = 20.0;
const GAMES_PER_ROW: usize = 4;

/// Host-side state the callbacks write to.
#[derive(Debug, Default)]
struct Screen {
    scroll: Cell<Point>,
    selected: RefCell<Option<System>>,
    launched: RefCell<Vec<String>>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut nav = Dispatcher::init(InitOptions {
        debug: true,
        visual_debug: true,
        // Remotes that report OK as 23 as well as 13.
        key_map: {
            let mut keys = KeyMap::default();
            keys.bind(23, dpad_dispatcher::Input::Enter);
            keys
        },
        ..InitOptions::default()
    });
    let screen = Rc::new(Screen::default());

    mount_systems(&mut nav, &screen);
    press(&mut nav, &[KeyMap::RIGHT, KeyMap::RIGHT, KeyMap::LEFT, KeyMap::UP, 23]);

    let Some(system) = *screen.selected.borrow() else {
        tracing::warn!("no system selected");
        return;
    };
    unmount(&mut nav, "systems");
    tracing::info!(focused = ?nav.current_focus_key(), "home screen unmounted");

    mount_games(&mut nav, &screen, system);
    press(
        &mut nav,
        &[KeyMap::DOWN, KeyMap::RIGHT, KeyMap::RIGHT, KeyMap::DOWN, KeyMap::ENTER],
    );

    for b in nav.debug_overlay() {
        tracing::info!(
            key = %b.focus_key,
            depth = b.depth,
            x = b.rect.x0,
            y = b.rect.y0,
            focused = b.focused,
            has_focused_child = b.has_focused_child,
            "overlay"
        );
    }
    tracing::info!(launched = ?screen.launched.borrow(), "done");
}

/// Home screen: a horizontally scrolling row of systems.
fn mount_systems(nav: &mut Dispatcher, screen: &Rc<Screen>) {
    // Children mount first.
    for (i, system) in SYSTEMS.iter().copied().enumerate() {
        let key = format!("system-{}", system.id);
        let scroll = Rc::clone(screen);
        let selected = Rc::clone(screen);
        nav.register_node(
            NodeConfig::new()
                .key(key.as_str())
                .parent("systems")
                .extra_props(system)
                .on_focus(move |details, _| {
                    if let Some(layout) = details.layout {
                        scroll.scroll.set(Point::new(layout.x0, 0.0));
                        tracing::info!(x = layout.x0, "scroll systems row");
                    }
                })
                .on_enter_press(move |_, _| {
                    tracing::info!(system = system.name, games = system.games, "open system");
                    *selected.selected.borrow_mut() = Some(system);
                }),
        )
        .expect("system keys are unique");
        let x = i as f64 * (TILE + GAP);
        nav.update_layout(&key, Rect::new(x, 0.0, x + TILE, 400.0));
    }

    nav.register_node(
        NodeConfig::new()
            .key("systems")
            .track_children(true)
            .on_arrow_press(|direction, _, _| {
                tracing::debug!(?direction, "systems row saw arrow");
                Outcome::Continue
            }),
    )
    .expect("systems key is unique");
    nav.update_layout(
        "systems",
        Rect::new(0.0, 0.0, SYSTEMS.len() as f64 * (TILE + GAP), 400.0),
    );
    let orphans = nav.settle();
    assert!(orphans.is_empty(), "every system found its row");

    // Data arrived: take focus.
    nav.focus_self("systems");
    tracing::info!(
        focused = ?nav.current_focus_key(),
        tracking = nav.has_focused_child("systems"),
        "home screen ready"
    );
}

/// Games screen: a wrapping grid for one system.
fn mount_games(nav: &mut Dispatcher, screen: &Rc<Screen>, system: System) {
    nav.register_node(
        NodeConfig::new()
            .key("games")
            .track_children(true)
            .save_last_focused_child(true),
    )
    .expect("games key is unique");

    for i in 0..system.games {
        let key = format!("{}-game-{i}", system.id);
        let scroll = Rc::clone(screen);
        let launched = Rc::clone(screen);
        let title = format!("{} #{}", system.name, i + 1);
        nav.register_node(
            NodeConfig::new()
                .key(key.as_str())
                .parent("games")
                .on_focus(move |details, _| {
                    if let Some(layout) = details.layout {
                        scroll.scroll.set(Point::new(layout.x0, layout.y0));
                    }
                })
                .on_enter_release(move |_, _| {
                    tracing::info!(title = %title, "launch game");
                    launched.launched.borrow_mut().push(title.clone());
                }),
        )
        .expect("game keys are unique");
        let (col, row) = (i % GAMES_PER_ROW, i / GAMES_PER_ROW);
        let (x, y) = (col as f64 * (TILE + GAP), row as f64 * (TILE + GAP));
        nav.update_layout(&key, Rect::new(x, y, x + TILE, y + TILE));
    }

    nav.focus_self("games");
    tracing::info!(
        focused = ?nav.current_focus_key(),
        scroll = ?screen.scroll.get(),
        "games screen ready"
    );
}

/// Unregister a container and everything under it, leaves first.
fn unmount(nav: &mut Dispatcher, container: &str) {
    let Some(id) = nav.tree().id_of(container) else {
        return;
    };
    let mut keys = Vec::new();
    let mut cursor = nav.tree().next_depth_first(id);
    while let Some(node) = cursor.filter(|&n| nav.tree().is_ancestor(id, n)) {
        if let Some(key) = nav.tree().key_of(node) {
            keys.push(key.to_string());
        }
        cursor = nav.tree().next_depth_first(node);
    }
    for key in keys.iter().rev() {
        nav.unregister_node(key);
    }
    nav.unregister_node(container);
}

/// Feed raw key codes as the remote would: down, then up.
fn press(nav: &mut Dispatcher, codes: &[u32]) {
    for &code in codes {
        let handled = nav.handle_key_down(code);
        nav.handle_key_up(code);
        tracing::info!(code, handled, focused = ?nav.current_focus_key(), "key");
    }
}
