//! Screen transition table.

/// Which screen is active, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Title,
    Menu,
    PlayersSelect,
    Playing,
    Results,
    Exit,
}

impl StateKind {
    pub const ALL: [StateKind; 6] = [
        StateKind::Title,
        StateKind::Menu,
        StateKind::PlayersSelect,
        StateKind::Playing,
        StateKind::Results,
        StateKind::Exit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StateKind::Title => "Title",
            StateKind::Menu => "Menu",
            StateKind::PlayersSelect => "PlayersSelect",
            StateKind::Playing => "Tetris",
            StateKind::Results => "Results",
            StateKind::Exit => "Exit",
        }
    }
}

/// Everything that can move the app between screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEvent {
    Confirm,
    Back,
    /// Menu item "Play".
    StartMatch,
    /// Menu item "Players".
    ChoosePlayers,
    /// Every session is over and the grace period ran out.
    AllGameOver,
    /// Esc/End during a match.
    EndMatch,
    /// Ctrl+C or the menu item "Quit".
    Quit,
}

impl AppEvent {
    pub const ALL: [AppEvent; 7] = [
        AppEvent::Confirm,
        AppEvent::Back,
        AppEvent::StartMatch,
        AppEvent::ChoosePlayers,
        AppEvent::AllGameOver,
        AppEvent::EndMatch,
        AppEvent::Quit,
    ];
}

/// The screen `event` leads to from `kind`, or `None` if it is ignored there.
pub fn next_state(kind: StateKind, event: AppEvent) -> Option<StateKind> {
    use AppEvent::*;
    use StateKind::*;

    match (kind, event) {
        (Exit, _) => None,
        (_, Quit) => Some(Exit),

        (Title, Confirm) => Some(Menu),
        (Title, Back) => Some(Exit),

        (Menu, StartMatch) => Some(Playing),
        (Menu, ChoosePlayers) => Some(PlayersSelect),
        (Menu, Back) => Some(Title),

        (PlayersSelect, Confirm | Back) => Some(Menu),

        (Playing, AllGameOver | EndMatch) => Some(Results),

        (Results, Confirm | Back) => Some(Menu),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn full_table() {
        let mut legal = Vec::new();
        for kind in StateKind::ALL {
            for event in AppEvent::ALL {
                if let Some(next) = next_state(kind, event) {
                    legal.push((kind, event, next));
                }
            }
        }

        use AppEvent::*;
        use StateKind::*;
        let expected = vec![
            (Title, Confirm, Menu),
            (Title, Back, Exit),
            (Title, Quit, Exit),
            (Menu, Back, Title),
            (Menu, StartMatch, Playing),
            (Menu, ChoosePlayers, PlayersSelect),
            (Menu, Quit, Exit),
            (PlayersSelect, Confirm, Menu),
            (PlayersSelect, Back, Menu),
            (PlayersSelect, Quit, Exit),
            (Playing, AllGameOver, Results),
            (Playing, EndMatch, Results),
            (Playing, Quit, Exit),
            (Results, Confirm, Menu),
            (Results, Back, Menu),
            (Results, Quit, Exit),
        ];
        assert_eq!(legal, expected);
    }

    #[test]
    fn exit_is_terminal() {
        for event in AppEvent::ALL {
            assert_eq!(next_state(StateKind::Exit, event), None);
        }
    }

    #[test]
    fn every_state_is_reachable_from_title() {
        let mut seen = HashSet::from([StateKind::Title]);
        let mut frontier = vec![StateKind::Title];
        while let Some(kind) = frontier.pop() {
            for event in AppEvent::ALL {
                if let Some(next) = next_state(kind, event) {
                    if seen.insert(next) {
                        frontier.push(next);
                    }
                }
            }
        }
        assert_eq!(seen.len(), StateKind::ALL.len());
    }

    #[test]
    fn match_events_only_apply_while_playing() {
        for kind in StateKind::ALL {
            if kind != StateKind::Playing {
                assert_eq!(next_state(kind, AppEvent::AllGameOver), None);
                assert_eq!(next_state(kind, AppEvent::EndMatch), None);
            }
        }
    }
}
