//! Input handling systems

use bevy::prelude::*;

use crate::simulation::ControlInput;

/// Handle basic keyboard input
pub fn handle_input(keyboard: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}

/// Map the arrow keys to driver intents
pub fn control_from_keyboard(keyboard: &ButtonInput<KeyCode>) -> ControlInput {
    ControlInput::from_keys(
        keyboard.pressed(KeyCode::ArrowUp),
        keyboard.pressed(KeyCode::ArrowDown),
        keyboard.pressed(KeyCode::ArrowLeft),
        keyboard.pressed(KeyCode::ArrowRight),
    )
}
