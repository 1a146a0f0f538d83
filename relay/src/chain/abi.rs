//! The escrow's externally observable surface (`spec.md` §4.8), expressed as
//! an `ethers` contract binding rather than vendored Solidity — this core
//! only depends on the contract's *interface*, not its implementation.

use ethers::contract::abigen;

abigen!(
    EscrowPool,
    r#"[
        function deposit(uint256 amount) external
        function operatorWithdraw(address to, uint256 amount, uint256 depositId, bytes32 jobId) external
        function paused() external view returns (bool)
        event Deposited(address indexed from, uint256 amount, uint256 depositId)
        event Withdrawn(address indexed to, uint256 amount, uint256 indexed depositId, bytes32 jobId)
    ]"#,
);
