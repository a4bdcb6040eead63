// Copyright (C) 2020-2024 Andy Kurnia.

#[macro_use]
pub mod error;

pub mod alphabet;
pub mod anagram;
pub mod bag;
pub mod board;
pub mod board_layout;
pub mod build;
pub mod cache;
pub mod config;
pub mod dawg;
pub mod event;
pub mod game;
pub mod game_config;
pub mod game_state;
pub mod game_timers;
pub mod inventory;
pub mod letter_distribution;
pub mod matrix;
