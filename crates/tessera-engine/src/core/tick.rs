use anyhow::Result;

/// Source of drawables for the frame loop.
///
/// Implemented by [`crate::device::Gpu`]; tests substitute a fake.
pub trait FramePresenter {
    type Drawable;
    type Submission;

    /// Next drawable, or `None` when this tick must be skipped. `Err` is fatal.
    fn acquire_drawable(&mut self) -> Result<Option<Self::Drawable>>;

    /// Hands a rendered drawable back for display.
    fn present(&mut self, drawable: Self::Drawable, submission: Self::Submission);
}

/// What happened to one display tick.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickOutcome {
    /// Drawn, submitted and presented.
    Presented,
    /// No drawable was available; nothing was drawn.
    Skipped,
    /// A drawable was acquired but the renderer dropped the frame.
    Dropped,
}

/// Runs one acquire -> render -> present sequence.
///
/// `render` receives the presenter (for device access) and the drawable, and
/// returns the submission to present, or `None` to drop the frame. A dropped
/// drawable is discarded without being presented.
pub fn drive_tick<P, F>(presenter: &mut P, render: F) -> Result<TickOutcome>
where
    P: FramePresenter,
    F: FnOnce(&P, &P::Drawable) -> Option<P::Submission>,
{
    let Some(drawable) = presenter.acquire_drawable()? else {
        return Ok(TickOutcome::Skipped);
    };

    let Some(submission) = render(presenter, &drawable) else {
        return Ok(TickOutcome::Dropped);
    };

    presenter.present(drawable, submission);
    Ok(TickOutcome::Presented)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[derive(Default)]
    struct FakeSurface {
        ready: Vec<bool>,
        fail: bool,
        acquired: u32,
        presented: Vec<(u32, u32)>,
    }

    impl FramePresenter for FakeSurface {
        type Drawable = u32;
        type Submission = u32;

        fn acquire_drawable(&mut self) -> Result<Option<u32>> {
            if self.fail {
                return Err(anyhow!("out of memory"));
            }
            let ready = self.ready.pop().unwrap_or(true);
            if !ready {
                return Ok(None);
            }
            self.acquired += 1;
            Ok(Some(self.acquired))
        }

        fn present(&mut self, drawable: u32, submission: u32) {
            self.presented.push((drawable, submission));
        }
    }

    #[test]
    fn not_ready_surface_issues_no_draw() {
        let mut surface = FakeSurface { ready: vec![false], ..Default::default() };
        let mut draws = 0;
        let outcome = drive_tick(&mut surface, |_, _| {
            draws += 1;
            Some(0)
        })
        .unwrap();

        assert_eq!(outcome, TickOutcome::Skipped);
        assert_eq!(draws, 0);
        assert!(surface.presented.is_empty());
    }

    #[test]
    fn dropped_frame_is_not_presented() {
        let mut surface = FakeSurface::default();
        let outcome = drive_tick(&mut surface, |_, _| None).unwrap();
        assert_eq!(outcome, TickOutcome::Dropped);
        assert!(surface.presented.is_empty());
    }

    #[test]
    fn frames_present_in_submission_order() {
        let mut surface = FakeSurface::default();
        let mut next_submission = 100;
        for _ in 0..3 {
            let outcome = drive_tick(&mut surface, |_, _| {
                next_submission += 1;
                Some(next_submission)
            })
            .unwrap();
            assert_eq!(outcome, TickOutcome::Presented);
        }
        assert_eq!(surface.presented, vec![(1, 101), (2, 102), (3, 103)]);
    }

    #[test]
    fn skip_then_recover_on_next_tick() {
        // `ready` is popped from the back: first tick not ready, second ready.
        let mut surface = FakeSurface { ready: vec![true, false], ..Default::default() };
        assert_eq!(drive_tick(&mut surface, |_, _| Some(7)).unwrap(), TickOutcome::Skipped);
        assert_eq!(drive_tick(&mut surface, |_, _| Some(7)).unwrap(), TickOutcome::Presented);
        assert_eq!(surface.presented, vec![(1, 7)]);
    }

    #[test]
    fn fatal_acquire_propagates() {
        let mut surface = FakeSurface { fail: true, ..Default::default() };
        assert!(drive_tick(&mut surface, |_, _| Some(0)).is_err());
    }
}
