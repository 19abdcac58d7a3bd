use smallvec::SmallVec;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The region was replaced by its four quadrants.
    Subdivided([RegionSpan; 4]),
    /// An atomic region was disclosed at full fidelity.
    Solved(RegionSpan),
}

/// Live set of clickable regions over one hidden image.
///
/// Regions never overlap, and together they cover exactly the part of the
/// image that is still hidden.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevealEngine {
    regions: Vec<Region>,
}

impl RevealEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a puzzle with the four grid quadrants, painting each with its
    /// average color.
    pub fn seed<S: Surface + ?Sized>(hidden: &PixelBuffer, surface: &mut S) -> Result<Self> {
        let regions: Vec<_> = RegionSpan::seed_quadrants()
            .into_iter()
            .map(|span| Region::new(span, hidden))
            .collect();
        for region in &regions {
            region.draw(surface)?;
        }
        log::debug!("seeded {} regions", regions.len());
        Ok(Self { regions })
    }

    /// Rebuilds regions from persisted spans, recomputing their colors.
    /// Nothing is drawn.
    pub fn restore(spans: &[RegionSpan], hidden: &PixelBuffer) -> Result<Self> {
        for (i, span) in spans.iter().enumerate() {
            let span = RegionSpan::new(span.x_range(), span.y_range())?;
            if !span.is_well_formed() || spans[..i].iter().any(|other| other.overlaps(&span)) {
                return Err(GameError::InvalidRegion);
            }
        }

        let regions = spans.iter().map(|&span| Region::new(span, hidden)).collect();
        Ok(Self { regions })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn spans(&self) -> Vec<RegionSpan> {
        self.regions.iter().map(Region::span).collect()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Number of grid cells still covered.
    pub fn hidden_cells(&self) -> u16 {
        self.regions.iter().map(|region| region.span().cell_count()).sum()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// All live regions containing `point`, in live-set order.
    pub fn hit_test(&self, point: GridPoint) -> SmallVec<[RegionSpan; 1]> {
        self.regions
            .iter()
            .filter(|region| region.contains(point))
            .map(Region::span)
            .collect()
    }

    /// Highlights the region under `point` and restores the plain fill of a
    /// region the pointer left. Returns whether anything was redrawn.
    pub fn hover<S: Surface + ?Sized>(&mut self, point: GridPoint, surface: &mut S) -> Result<bool> {
        let mut redrawn = false;
        for region in &mut self.regions {
            let hit = region.contains(point);
            if hit && !region.is_selected() {
                region.set_selected(true);
                region.draw_highlight(surface)?;
                redrawn = true;
            } else if !hit && region.is_selected() {
                region.set_selected(false);
                region.draw(surface)?;
                redrawn = true;
            }
        }
        if redrawn {
            log::trace!("hover at {:?}", point);
        }
        Ok(redrawn)
    }

    /// Resolves the first region under `point`, if any.
    pub fn resolve_at<S: Surface + ?Sized>(
        &mut self,
        point: GridPoint,
        hidden: &PixelBuffer,
        surface: &mut S,
    ) -> Result<Option<ResolveOutcome>> {
        match self.hit_test(point).first() {
            Some(&span) => self.resolve(span, hidden, surface).map(Some),
            None => Ok(None),
        }
    }

    /// Subdivides a live region into four freshly sampled quadrants, or
    /// copies the hidden pixels of an atomic one onto the surface. Either
    /// way the region leaves the live set.
    pub fn resolve<S: Surface + ?Sized>(
        &mut self,
        span: RegionSpan,
        hidden: &PixelBuffer,
        surface: &mut S,
    ) -> Result<ResolveOutcome> {
        let index = self
            .regions
            .iter()
            .position(|region| region.span() == span)
            .ok_or(GameError::UnknownRegion)?;

        let outcome = match span.split() {
            Some(quadrants) => {
                let children = quadrants.map(|child| Region::new(child, hidden));
                for child in &children {
                    child.draw(surface)?;
                }
                self.regions.splice(index..=index, children);
                ResolveOutcome::Subdivided(quadrants)
            }
            None => {
                let rect = span.pixel_rect();
                surface.put_pixels(&hidden.crop(rect), rect.x, rect.y)?;
                self.regions.remove(index);
                ResolveOutcome::Solved(span)
            }
        };

        log::debug!("resolved {:?}: {:?}", span, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> PixelBuffer {
        PixelBuffer::from_fn(SURFACE_SIZE, SURFACE_SIZE, |x, y| {
            Rgb::new((x / 4) as u8, (y / 4) as u8, ((x + y) / 8) as u8)
        })
    }

    fn span(x: CoordRange, y: CoordRange) -> RegionSpan {
        RegionSpan::new(x, y).unwrap()
    }

    fn assert_partition(engine: &RevealEngine) {
        let regions = engine.regions();
        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                assert!(!a.span().overlaps(&b.span()), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn seed_paints_four_quadrants() {
        let hidden = gradient();
        let mut surface = PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE);

        let engine = RevealEngine::seed(&hidden, &mut surface).unwrap();

        assert_eq!(engine.len(), 4);
        assert_eq!(engine.hidden_cells(), 256);
        let top_left = engine.regions()[0];
        assert_eq!(top_left.span(), span((1, 8), (1, 8)));
        assert_eq!(surface.pixel(100, 100), top_left.fill_color());
        assert_eq!(
            top_left.fill_color(),
            hidden.rms_color(PixelRect::new(0, 0, 512, 512))
        );
    }

    #[test]
    fn click_in_quadrant_yields_seven_regions() {
        let hidden = gradient();
        let mut surface = PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE);
        let mut engine = RevealEngine::seed(&hidden, &mut surface).unwrap();

        let outcome = engine
            .resolve_at(GridPoint::new(3, 5), &hidden, &mut surface)
            .unwrap();

        assert!(matches!(outcome, Some(ResolveOutcome::Subdivided(_))));
        assert_eq!(engine.len(), 7);
        assert!(!engine.spans().contains(&span((1, 8), (1, 8))));
        assert!(engine.spans().contains(&span((1, 4), (5, 8))));
        assert_partition(&engine);
    }

    #[test]
    fn atomic_region_discloses_hidden_pixels() {
        let hidden = gradient();
        let mut surface = PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE);
        let atom = span((2, 2), (3, 3));
        let mut engine = RevealEngine::restore(&[atom], &hidden).unwrap();

        let outcome = engine.resolve(atom, &hidden, &mut surface).unwrap();

        assert_eq!(outcome, ResolveOutcome::Solved(atom));
        assert!(engine.is_empty());
        let rect = atom.pixel_rect();
        assert_eq!(surface.crop(rect), hidden.crop(rect));
        assert_eq!(surface.pixel(rect.x - 1, rect.y), Rgb::BLACK);
    }

    #[test]
    fn full_subdivision_terminates_within_four_levels() {
        let hidden = gradient();
        let mut surface = PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE);
        let mut engine = RevealEngine::seed(&hidden, &mut surface).unwrap();
        let mut clicks = 0;

        while let Some(region) = engine.regions().first().copied() {
            engine.resolve(region.span(), &hidden, &mut surface).unwrap();
            clicks += 1;
            assert!(region.span().width() >= 1);
            assert!(clicks <= 4 + 16 + 64 + 256 + 256);
        }

        // every level is clicked once per region, atoms included
        assert_eq!(clicks, 4 + 16 + 64 + 256);
        assert_eq!(surface, hidden);
    }

    #[test]
    fn live_set_stays_exhaustive_over_hidden_area() {
        let hidden = gradient();
        let mut surface = PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE);
        let mut engine = RevealEngine::seed(&hidden, &mut surface).unwrap();
        let mut solved_cells = 0;

        for (x, y) in [(1, 1), (1, 1), (1, 1), (1, 1), (16, 16), (9, 2), (9, 2)] {
            let point = GridPoint::new(x, y);
            if let Some(ResolveOutcome::Solved(_)) =
                engine.resolve_at(point, &hidden, &mut surface).unwrap()
            {
                solved_cells += 1;
            }
            assert_eq!(engine.hidden_cells() + solved_cells, 256);
            assert_partition(&engine);
        }
        assert_eq!(solved_cells, 1);
    }

    #[test]
    fn hit_test_outside_grid_is_empty() {
        let hidden = gradient();
        let mut surface = PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE);
        let mut engine = RevealEngine::seed(&hidden, &mut surface).unwrap();

        assert!(engine.hit_test(GridPoint::new(0, 5)).is_empty());
        assert!(engine.hit_test(GridPoint::new(17, 5)).is_empty());
        assert_eq!(
            engine
                .resolve_at(GridPoint::new(-3, 40), &hidden, &mut surface)
                .unwrap(),
            None
        );
        assert_eq!(engine.hit_test(GridPoint::new(9, 8)).as_slice(), &[span((9, 16), (1, 8))]);
    }

    #[test]
    fn hover_highlights_then_restores_fill() {
        let hidden = PixelBuffer::filled(SURFACE_SIZE, SURFACE_SIZE, Rgb::new(20, 20, 20));
        let mut surface = PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE);
        let mut engine = RevealEngine::seed(&hidden, &mut surface).unwrap();

        assert!(engine.hover(GridPoint::new(2, 2), &mut surface).unwrap());
        assert!(engine.regions()[0].is_selected());
        assert_eq!(surface.pixel(0, 0), Rgb::WHITE);

        assert!(!engine.hover(GridPoint::new(3, 3), &mut surface).unwrap());

        assert!(engine.hover(GridPoint::OUTSIDE, &mut surface).unwrap());
        assert!(!engine.regions()[0].is_selected());
        assert_eq!(surface.pixel(0, 0), Rgb::new(20, 20, 20));
    }

    #[test]
    fn restore_recomputes_identical_regions() {
        let hidden = gradient();
        let mut surface = PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE);
        let mut engine = RevealEngine::seed(&hidden, &mut surface).unwrap();
        engine.resolve_at(GridPoint::new(12, 12), &hidden, &mut surface).unwrap();
        engine.resolve_at(GridPoint::new(12, 12), &hidden, &mut surface).unwrap();

        let restored = RevealEngine::restore(&engine.spans(), &hidden).unwrap();

        assert_eq!(restored, engine);
    }

    #[test]
    fn restore_rejects_overlapping_or_malformed_spans() {
        let hidden = gradient();
        let overlapping = [span((1, 8), (1, 8)), span((1, 4), (1, 4))];
        let misaligned = [span((2, 3), (1, 2))];

        assert_eq!(
            RevealEngine::restore(&overlapping, &hidden),
            Err(GameError::InvalidRegion)
        );
        assert_eq!(
            RevealEngine::restore(&misaligned, &hidden),
            Err(GameError::InvalidRegion)
        );
    }

    #[test]
    fn resolving_unknown_region_fails() {
        let hidden = gradient();
        let mut surface = PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE);
        let mut engine = RevealEngine::seed(&hidden, &mut surface).unwrap();

        assert_eq!(
            engine.resolve(span((1, 4), (1, 4)), &hidden, &mut surface),
            Err(GameError::UnknownRegion)
        );
    }
}
