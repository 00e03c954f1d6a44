/// integrators sampling y' = f(t, y) at a prescribed sequence of times (DOPRI, RK4, AB4)
pub mod ODE_integrators;
///  solve scalar and vector IVPs on [tmin, tmax] from an inner initial point t0
/// Example#1
/// ```
/// use RustedDETools::numerical::IVP_bidirectional::solve_de_system;
/// use RustedDETools::numerical::ODE_integrators::IVPConfig;
/// use nalgebra::DVector;
/// // harmonic oscillator x'' = -w^2 x, w passed as parameter
/// let f = |_t: f64, x: &DVector<f64>, w: &f64| DVector::from_vec(vec![x[1], -w * w * x[0]]);
/// let x0 = DVector::from_vec(vec![1.0, 0.0]);
/// let config = IVPConfig::default().with_tdelta(0.1);
/// let sol = solve_de_system(f, 0.0, &x0, -1.0, 1.0, &config, &2.0).unwrap();
/// // one row per component, one column per time sample
/// assert_eq!(sol.x_values.shape(), (2, 21));
/// assert_eq!(sol.t0_index, 10);
/// ```
pub mod IVP_bidirectional;
/// direction fields and slope fields
pub mod direction_fields;
