//! Dart state and the round-in-progress buffer.
//!
//! `RoundDarts` owns the three darts of each player plus the single closest
//! selection for the round. All mutations go through it so that the
//! round-wide shot caps and wiggle nobber references hold no matter who the
//! caller is. A mutation either applies fully or returns an error and leaves
//! the buffer untouched.

use crate::models::player::Side;
use crate::models::preferences::InputMode;
use crate::models::shot::{CapGroup, SpecialtyShot};
use serde::{Deserialize, Serialize};

/// Darts each player throws per round.
pub const DARTS_PER_PLAYER: usize = 3;

/// Resolution of a single dart.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DartStatus {
    /// Not yet resolved.
    #[default]
    Empty,
    Landed,
    Missed,
}

/// Points at one dart in the round: the thrower and the position in their throw order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct DartRef {
    pub side: Side,
    pub index: usize,
}

impl DartRef {
    pub fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }
}

/// One thrown dart.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Dart {
    pub status: DartStatus,
    /// Only set while landed.
    #[serde(default)]
    pub shot: Option<SpecialtyShot>,
    /// Only set for a wiggle nobber.
    #[serde(default)]
    pub target: Option<DartRef>,
}

impl Dart {
    pub fn landed() -> Self {
        Self {
            status: DartStatus::Landed,
            ..Self::default()
        }
    }

    pub fn missed() -> Self {
        Self {
            status: DartStatus::Missed,
            ..Self::default()
        }
    }

    pub fn is_landed(&self) -> bool {
        self.status == DartStatus::Landed
    }

    pub fn is_resolved(&self) -> bool {
        self.status != DartStatus::Empty
    }

    /// Landed with no specialty shot.
    pub fn is_ordinary(&self) -> bool {
        self.is_landed() && self.shot.is_none()
    }

    fn clear_shot(&mut self) {
        self.shot = None;
        self.target = None;
    }
}

/// The round's closest player, optionally pinned to a specific dart (advanced tracking).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClosestSelection {
    pub side: Side,
    #[serde(default)]
    pub dart: Option<usize>,
}

impl ClosestSelection {
    pub fn player(side: Side) -> Self {
        Self { side, dart: None }
    }

    pub fn dart(at: DartRef) -> Self {
        Self {
            side: at.side,
            dart: Some(at.index),
        }
    }
}

/// Structural problems with a round's darts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DartError {
    IndexOutOfRange(usize),
    /// Shots and closest picks need a landed dart.
    NotLanded(DartRef),
    /// The shot's per-round cap is already taken by another dart.
    ShotCapReached(SpecialtyShot),
    TripleNobberWithoutTNobber,
    /// A wiggle nobber was given no target.
    MissingTarget,
    /// A target was given for a shot other than a wiggle nobber.
    UnexpectedTarget,
    /// Target is the dart itself, not landed, or another wiggle nobber.
    InvalidTarget(DartRef),
    /// The dart is referenced by a wiggle nobber and cannot become one.
    TargetedByWiggle(DartRef),
    ClosestDartNotLanded(DartRef),
}

impl std::fmt::Display for DartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DartError::IndexOutOfRange(i) => {
                write!(f, "Dart index {} is out of range (0..{})", i, DARTS_PER_PLAYER)
            }
            DartError::NotLanded(at) => write!(
                f,
                "Dart {} of player {} has not landed",
                at.index + 1,
                at.side.number()
            ),
            DartError::ShotCapReached(shot) => {
                write!(f, "Only one {} is allowed per round", shot.label())
            }
            DartError::TripleNobberWithoutTNobber => {
                write!(f, "A Triple Nobber needs a T-Nobber in the same round")
            }
            DartError::MissingTarget => write!(f, "A Wiggle Nobber needs a target dart"),
            DartError::UnexpectedTarget => write!(f, "Only a Wiggle Nobber can target another dart"),
            DartError::InvalidTarget(at) => write!(
                f,
                "Dart {} of player {} cannot be a Wiggle Nobber target",
                at.index + 1,
                at.side.number()
            ),
            DartError::TargetedByWiggle(at) => write!(
                f,
                "Dart {} of player {} is a Wiggle Nobber target",
                at.index + 1,
                at.side.number()
            ),
            DartError::ClosestDartNotLanded(at) => write!(
                f,
                "Closest dart {} of player {} has not landed",
                at.index + 1,
                at.side.number()
            ),
        }
    }
}

impl std::error::Error for DartError {}

/// All six darts of a round plus the closest selection.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundDarts {
    player1: [Dart; DARTS_PER_PLAYER],
    player2: [Dart; DARTS_PER_PLAYER],
    #[serde(default)]
    closest: Option<ClosestSelection>,
}

impl RoundDarts {
    /// A fresh round: every dart empty, nobody closest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw parts, rejecting anything that breaks a round invariant.
    pub fn from_parts(
        player1: [Dart; DARTS_PER_PLAYER],
        player2: [Dart; DARTS_PER_PLAYER],
        closest: Option<ClosestSelection>,
    ) -> Result<Self, DartError> {
        let darts = Self {
            player1,
            player2,
            closest,
        };
        darts.validate()?;
        Ok(darts)
    }

    /// What a confirmed no-throw wash records.
    pub fn all_missed() -> Self {
        Self {
            player1: [Dart::missed(); DARTS_PER_PLAYER],
            player2: [Dart::missed(); DARTS_PER_PLAYER],
            closest: None,
        }
    }

    pub fn darts(&self, side: Side) -> &[Dart; DARTS_PER_PLAYER] {
        match side {
            Side::One => &self.player1,
            Side::Two => &self.player2,
        }
    }

    fn darts_mut(&mut self, side: Side) -> &mut [Dart; DARTS_PER_PLAYER] {
        match side {
            Side::One => &mut self.player1,
            Side::Two => &mut self.player2,
        }
    }

    pub fn dart(&self, at: DartRef) -> Option<&Dart> {
        self.darts(at.side).get(at.index)
    }

    pub fn closest(&self) -> Option<ClosestSelection> {
        self.closest
    }

    pub fn closest_side(&self) -> Option<Side> {
        self.closest.map(|c| c.side)
    }

    /// Every dart with its reference, player one first.
    pub fn iter(&self) -> impl Iterator<Item = (DartRef, &Dart)> + '_ {
        Side::BOTH.into_iter().flat_map(move |side| {
            self.darts(side)
                .iter()
                .enumerate()
                .map(move |(index, dart)| (DartRef::new(side, index), dart))
        })
    }

    pub fn landed_count(&self, side: Side) -> usize {
        self.darts(side).iter().filter(|d| d.is_landed()).count()
    }

    pub fn resolved_count(&self, side: Side) -> usize {
        self.darts(side).iter().filter(|d| d.is_resolved()).count()
    }

    pub fn total_landed(&self) -> usize {
        self.landed_count(Side::One) + self.landed_count(Side::Two)
    }

    /// Whether any dart in the round (either player) carries `shot`.
    pub fn has_shot(&self, shot: SpecialtyShot) -> bool {
        self.iter().any(|(_, d)| d.shot == Some(shot))
    }

    /// Apply a tap according to the input mode.
    ///
    /// Casual: tapping a landed dart misses it and every later dart of that
    /// player; tapping any other dart lands it and every earlier one.
    /// Advanced: the tapped dart cycles empty -> landed -> missed -> empty.
    pub fn tap(&mut self, at: DartRef, mode: InputMode) -> Result<(), DartError> {
        self.check_index(at)?;
        let mut next = self.clone();
        let darts = next.darts_mut(at.side);
        match mode {
            InputMode::Casual => {
                if darts[at.index].is_landed() {
                    for dart in &mut darts[at.index..] {
                        dart.status = DartStatus::Missed;
                    }
                } else {
                    for dart in &mut darts[..=at.index] {
                        dart.status = DartStatus::Landed;
                    }
                }
            }
            InputMode::Advanced => {
                let dart = &mut darts[at.index];
                dart.status = match dart.status {
                    DartStatus::Empty => DartStatus::Landed,
                    DartStatus::Landed => DartStatus::Missed,
                    DartStatus::Missed => DartStatus::Empty,
                };
            }
        }
        next.prune();
        *self = next;
        log::debug!(
            "tap {:?} dart {} of player {}",
            mode,
            at.index + 1,
            at.side.number()
        );
        Ok(())
    }

    /// Set a dart's status directly. Leaving `Landed` drops anything that depended on it.
    pub fn set_status(&mut self, at: DartRef, status: DartStatus) -> Result<(), DartError> {
        self.check_index(at)?;
        self.darts_mut(at.side)[at.index].status = status;
        self.prune();
        Ok(())
    }

    /// Set or clear a landed dart's specialty shot. `target` is required for a
    /// wiggle nobber and rejected otherwise.
    pub fn set_shot(
        &mut self,
        at: DartRef,
        shot: Option<SpecialtyShot>,
        target: Option<DartRef>,
    ) -> Result<(), DartError> {
        let dart = *self.dart(at).ok_or(DartError::IndexOutOfRange(at.index))?;
        if !dart.is_landed() {
            return Err(DartError::NotLanded(at));
        }
        match shot {
            Some(s) if s.requires_target() => {
                let target = target.ok_or(DartError::MissingTarget)?;
                self.check_target(at, target)?;
                if self.is_wiggle_target(at) {
                    return Err(DartError::TargetedByWiggle(at));
                }
            }
            _ if target.is_some() => return Err(DartError::UnexpectedTarget),
            _ => {}
        }
        if let Some(s) = shot {
            if let Some(group) = s.cap_group() {
                if self.count_group(group, at) > 0 {
                    return Err(DartError::ShotCapReached(s));
                }
            }
            if s == SpecialtyShot::TripleNobber
                && !self
                    .iter()
                    .any(|(r, d)| r != at && d.shot == Some(SpecialtyShot::TNobber))
            {
                return Err(DartError::TripleNobberWithoutTNobber);
            }
        }

        let mut next = self.clone();
        let slot = &mut next.darts_mut(at.side)[at.index];
        slot.shot = shot;
        slot.target = target;
        next.prune();
        *self = next;
        Ok(())
    }

    /// Select (or clear) the closest player. A pinned dart must be landed.
    pub fn set_closest(&mut self, selection: Option<ClosestSelection>) -> Result<(), DartError> {
        if let Some(ClosestSelection {
            side,
            dart: Some(index),
        }) = selection
        {
            let at = DartRef::new(side, index);
            match self.dart(at) {
                Some(d) if d.is_landed() => {}
                Some(_) => return Err(DartError::ClosestDartNotLanded(at)),
                None => return Err(DartError::IndexOutOfRange(index)),
            }
        }
        self.closest = selection;
        Ok(())
    }

    /// Check every round invariant. Used on darts that did not come through the mutators.
    pub fn validate(&self) -> Result<(), DartError> {
        for (at, dart) in self.iter() {
            if !dart.is_landed() && (dart.shot.is_some() || dart.target.is_some()) {
                return Err(DartError::NotLanded(at));
            }
            match (dart.shot, dart.target) {
                (Some(SpecialtyShot::WiggleNobber), Some(target)) => self.check_target(at, target)?,
                (Some(SpecialtyShot::WiggleNobber), None) => return Err(DartError::MissingTarget),
                (_, Some(_)) => return Err(DartError::UnexpectedTarget),
                _ => {}
            }
        }

        let mut taken: Vec<CapGroup> = Vec::new();
        for (_, dart) in self.iter() {
            if let Some(shot) = dart.shot {
                if let Some(group) = shot.cap_group() {
                    if taken.contains(&group) {
                        return Err(DartError::ShotCapReached(shot));
                    }
                    taken.push(group);
                }
            }
        }

        if self.has_shot(SpecialtyShot::TripleNobber) && !self.has_shot(SpecialtyShot::TNobber) {
            return Err(DartError::TripleNobberWithoutTNobber);
        }

        if let Some(ClosestSelection {
            side,
            dart: Some(index),
        }) = self.closest
        {
            let at = DartRef::new(side, index);
            if !self.dart(at).is_some_and(Dart::is_landed) {
                return Err(DartError::ClosestDartNotLanded(at));
            }
        }
        Ok(())
    }

    fn check_index(&self, at: DartRef) -> Result<(), DartError> {
        if at.index < DARTS_PER_PLAYER {
            Ok(())
        } else {
            Err(DartError::IndexOutOfRange(at.index))
        }
    }

    fn check_target(&self, from: DartRef, target: DartRef) -> Result<(), DartError> {
        if target == from {
            return Err(DartError::InvalidTarget(target));
        }
        match self.dart(target) {
            Some(d) if d.is_landed() && d.shot != Some(SpecialtyShot::WiggleNobber) => Ok(()),
            _ => Err(DartError::InvalidTarget(target)),
        }
    }

    fn is_wiggle_target(&self, at: DartRef) -> bool {
        self.iter()
            .any(|(_, d)| d.shot == Some(SpecialtyShot::WiggleNobber) && d.target == Some(at))
    }

    fn count_group(&self, group: CapGroup, except: DartRef) -> usize {
        self.iter()
            .filter(|(r, d)| *r != except && d.shot.and_then(SpecialtyShot::cap_group) == Some(group))
            .count()
    }

    /// Drop shots, targets and closest picks that no longer have what they depend on.
    fn prune(&mut self) {
        for side in Side::BOTH {
            for dart in self.darts_mut(side).iter_mut() {
                if !dart.is_landed() {
                    dart.clear_shot();
                } else if dart.shot != Some(SpecialtyShot::WiggleNobber) {
                    dart.target = None;
                }
            }
        }

        if self.has_shot(SpecialtyShot::TripleNobber) && !self.has_shot(SpecialtyShot::TNobber) {
            for side in Side::BOTH {
                for dart in self.darts_mut(side).iter_mut() {
                    if dart.shot == Some(SpecialtyShot::TripleNobber) {
                        dart.shot = None;
                        log::debug!("triple nobber cleared: no t-nobber left in round");
                    }
                }
            }
        }

        let broken: Vec<DartRef> = self
            .iter()
            .filter(|(at, d)| {
                d.shot == Some(SpecialtyShot::WiggleNobber)
                    && d.target.map_or(true, |t| self.check_target(*at, t).is_err())
            })
            .map(|(at, _)| at)
            .collect();
        for at in broken {
            self.darts_mut(at.side)[at.index].clear_shot();
            log::debug!(
                "wiggle nobber on dart {} of player {} lost its target",
                at.index + 1,
                at.side.number()
            );
        }

        if let Some(ClosestSelection {
            side,
            dart: Some(index),
        }) = self.closest
        {
            if !self.darts(side).get(index).is_some_and(Dart::is_landed) {
                self.closest = None;
            }
        }
    }
}
