//! Pictures and flavor text.

use rabbit_core::RabbitState;

/// A small picture of a rabbit in `state`.
pub fn rabbit_art(state: RabbitState) -> &'static str {
    match state {
        RabbitState::Wandering => concat!(
            " ()_()\n",
            " (-.-)\n",
            "'(\"|\")'\n",
        ),
        RabbitState::Spotted => concat!(
            "(_/  _#\n",
            "'.'_( )\n",
        ),
        RabbitState::Fleeing => concat!(
            "  o __(\\\\\n",
            "   ) _ --\n",
            " //    \\\\\n",
        ),
        RabbitState::Caught => concat!(
            "_________\n",
            "| ()|() |\n",
            "+---+---+\n",
            "|(\")|(\")|\n",
            "---------\n",
        ),
        RabbitState::Dead => concat!(
            "(\\ /)\n",
            "(x.x)\n",
            "(> <)\n",
        ),
    }
}

pub fn spotted_flavor(count: u64) -> &'static str {
    match count {
        0..=19 => "",
        20..=49 => ":)",
        _ => ":D",
    }
}

pub fn caught_flavor(count: u64) -> &'static str {
    match count {
        0..=4 => "",
        5..=19 => ":)",
        _ => ":D",
    }
}

/// The more rabbits killed, the more dramatic.
pub fn killed_flavor(count: u64) -> &'static str {
    match count {
        0..=4 => "",
        5..=19 => ":(",
        20..=49 => ";(",
        _ => "MONSTER!!",
    }
}
