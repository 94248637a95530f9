use fieldlinalg::{
    compute::{ComputeContext, ComputeMode, COMPUTE_MODE_ENV},
    domains::float::FloatField,
    tensors::Vector,
};

// A single test, since it modifies the environment of the process.
#[test]
fn compute_mode_from_env() {
    std::env::set_var(COMPUTE_MODE_ENV, "CPU");
    assert_eq!(ComputeContext::from_env().mode(), ComputeMode::Cpu);

    std::env::set_var(COMPUTE_MODE_ENV, "vulkan");
    assert_eq!(ComputeContext::from_env().mode(), ComputeMode::Auto);

    std::env::remove_var(COMPUTE_MODE_ENV);
    assert_eq!(ComputeContext::from_env().mode(), ComputeMode::Auto);

    std::env::set_var(COMPUTE_MODE_ENV, "gpu");
    let global = ComputeContext::global();
    assert_eq!(global.mode(), ComputeMode::Gpu);

    let v = Vector::new(vec![1., 2.], FloatField).unwrap();
    assert!(v.dot(&v).is_err());

    global.set_mode(ComputeMode::Auto);
    assert_eq!(v.dot(&v).unwrap(), 5.);
}
