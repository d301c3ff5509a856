#[derive(Clone, Copy, Debug)]
struct LinearPiece {
    base_x: f32,
    base_y: f32,
    max_x: f32,
    x_diff: f32,
    y_diff: f32,
}

/// Continuous piecewise linear function, flat past both ends
#[derive(Clone, Copy, Debug)]
pub struct LinearPieceCurve<const N: usize> {
    curve: [LinearPiece; N],
}

impl<const N: usize> LinearPieceCurve<N> {
    /// A mapping of `(x, y)` pairs that make up the continuous linear piecewise function.
    /// `x` must be strictly increasing.
    #[must_use]
    pub const fn new(value_mappings: [(f32, f32); N]) -> Self {
        let mut curve = [LinearPiece {
            base_x: 0.0,
            base_y: 0.0,
            max_x: 0.0,
            x_diff: 0.0,
            y_diff: 0.0,
        }; N];

        curve[0].base_y = value_mappings[0].1;
        curve[0].max_x = value_mappings[0].0;

        let mut i = 1;
        while i < N {
            let prev = &value_mappings[i - 1];
            let this = &value_mappings[i];

            curve[i].base_x = prev.0;
            curve[i].base_y = prev.1;
            curve[i].max_x = this.0;
            curve[i].x_diff = this.0 - prev.0;
            curve[i].y_diff = this.1 - prev.1;

            i += 1;
        }

        Self { curve }
    }

    #[must_use]
    pub fn get_output(&self, input: f32) -> f32 {
        debug_assert!(N != 0);

        let first = self.curve[0];
        if input <= first.max_x {
            return first.base_y;
        }

        let Some(piece) = self.curve.iter().skip(1).find(|piece| piece.max_x > input) else {
            let last = self.curve[N - 1];
            return last.base_y + last.y_diff;
        };

        let interp_frac = (input - piece.base_x) / piece.x_diff;
        piece.y_diff * interp_frac + piece.base_y
    }
}
